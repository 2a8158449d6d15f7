//! Chat API handlers
//!
//! Answers questions about Enes using the full personal information document
//! as context.

use axum::extract::{FromRequest, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::{user_data, AppState};

// ============ Types ============

/// JSON body extractor whose rejections use the API error format
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub status: &'static str,
}

/// Combine the personal document and the user's question into one prompt
pub fn build_prompt(user_data: &str, message: &str) -> String {
    format!(
        r#"You are Enes Aysu's personal assistant chatbot.

Here is Enes's complete personal information:

{user_data}

Based ONLY on the information provided above, please answer the following question about Enes in a friendly and informative way. If the information is not available in the provided data, please say so clearly.

Question: {message}

Answer:"#
    )
}

// ============ Chat Handler ============

/// Main chat endpoint
pub async fn chat(
    State(state): State<AppState>,
    AppJson(req): AppJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    tracing::info!("Chat request ({} chars)", req.message.len());

    let user_data = user_data::load(&state.user_data_path).await?;
    let prompt = build_prompt(&user_data, &req.message);
    let response = state.llm.generate(&prompt).await;

    Ok(Json(ChatResponse {
        response,
        status: "success",
    }))
}
