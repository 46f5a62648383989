use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether a completion endpoint base URL is configured.
    pub llm_configured: bool,
    /// Whether Salesforce credentials are configured.
    pub salesforce_configured: bool,
}

/// GET /health -- returns service status and which integrations are configured.
///
/// No external call is made; an unconfigured integration does not make the
/// service unhealthy.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        llm_configured: state.config.llm.api_base.is_some(),
        salesforce_configured: state.config.salesforce.is_configured(),
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
