//! Completion endpoint connectivity check.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use dre2flow_core::chat::ChatMessage;
use dre2flow_llm::CompletionOptions;

use crate::error::AppResult;
use crate::response::SuccessResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LlmTestResponse {
    pub response: String,
}

// ---------------------------------------------------------------------------
// GET /test-litellm
// ---------------------------------------------------------------------------

/// Send a fixed prompt and return the model's reply.
pub async fn test_litellm(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let reply = state
        .llm
        .complete(
            &[ChatMessage::user("Say hello world")],
            &CompletionOptions::default(),
        )
        .await?;

    tracing::info!(model = state.llm.model(), "LiteLLM connectivity check succeeded");
    Ok(Json(SuccessResponse::new(LlmTestResponse { response: reply })))
}
