//! Error types for the API

use axum::extract::rejection::JsonRejection;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Error reading user data: {0}")]
    UserData(#[source] std::io::Error),

    #[error("Invalid request body: {0}")]
    Json(#[from] JsonRejection),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::UserData(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Json(e) => e.status(),
        };

        tracing::error!("Request failed ({}): {}", status, self);

        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
