//! HTTP API

pub mod chat;
pub mod status;

use std::path::Path;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Build the application router
pub fn router(state: AppState, static_dir: &Path) -> Router {
    // Any origin, with credentials: mirror the request instead of using "*"
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    Router::new()
        // ============ Frontend ============
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        // ============ Chat API ============
        .route("/chat", post(chat::chat))
        .route("/user-data", get(status::get_user_data))
        // ============ Diagnostics ============
        .route("/health", get(status::health))
        .route("/llm-status", get(status::llm_status))
        .route("/test-llm", post(status::test_llm))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
