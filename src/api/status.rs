//! Health and diagnostic handlers

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::AppError;
use crate::llm::{BackendKind, LlmStatus};
use crate::{user_data, AppState};

const TEST_PROMPT: &str =
    "SYSTEM:\nSen Türkçe konuşan yardımcı bir asistansın.\n\nUSER:\nMerhaba, nasılsın?";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub llm_status: bool,
}

#[derive(Debug, Serialize)]
pub struct UserDataResponse {
    pub user_data: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LlmStatusResponse {
    pub llm_status: LlmStatus,
    pub backend: BackendKind,
    pub model: Option<String>,
    pub ready: bool,
}

#[derive(Debug, Serialize)]
pub struct TestLlmResponse {
    pub test_prompt: &'static str,
    pub response: String,
    pub backend: BackendKind,
    pub model: Option<String>,
    pub status: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "Personal Assistant Chatbot is running",
        llm_status: state.llm.is_ready(),
    })
}

/// Current contents of the personal information document
pub async fn get_user_data(
    State(state): State<AppState>,
) -> Result<Json<UserDataResponse>, AppError> {
    let user_data = user_data::load(&state.user_data_path).await?;
    Ok(Json(UserDataResponse {
        user_data,
        status: "success",
    }))
}

/// Detailed LLM status for debugging
pub async fn llm_status(State(state): State<AppState>) -> Json<LlmStatusResponse> {
    let status = state.llm.status();
    Json(LlmStatusResponse {
        backend: status.backend,
        model: status.model.clone(),
        ready: status.ready,
        llm_status: status,
    })
}

/// Run a fixed smoke-test prompt through the engine
pub async fn test_llm(State(state): State<AppState>) -> Json<TestLlmResponse> {
    let response = state.llm.generate(TEST_PROMPT).await;
    Json(TestLlmResponse {
        test_prompt: TEST_PROMPT,
        response,
        backend: state.llm.backend(),
        model: state.llm.model().map(str::to_string),
        status: "success",
    })
}
