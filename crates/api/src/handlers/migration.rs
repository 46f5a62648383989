//! Handler for migrating an uploaded DRE rule set into Salesforce flows.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use dre2flow_pipeline::SavedFlow;

use crate::error::{AppError, AppResult};
use crate::response::SuccessResponse;
use crate::state::AppState;

/// Upload form body. `jsonString` holds the rule set, either as parsed JSON
/// or as the raw file text.
#[derive(Debug, Deserialize)]
pub struct MigrateRequest {
    #[serde(rename = "jsonString", default)]
    pub json_string: Option<Value>,
}

/// The first generated flow at the top level, every flow under `flows`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateResponse {
    pub file_name: String,
    pub flow_content: String,
    pub path: String,
    pub flows: Vec<SavedFlow>,
}

// ---------------------------------------------------------------------------
// POST /migrate-dre-rule
// ---------------------------------------------------------------------------

/// Validate, translate and generate one flow per rule.
///
/// An unsupported rule anywhere in the set rejects the whole request with
/// 400 before any completion request is made.
pub async fn migrate_dre_rule(
    State(state): State<AppState>,
    payload: Result<Json<MigrateRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(request) = payload?;
    let rule_set = request
        .json_string
        .filter(|v| !v.is_null())
        .ok_or_else(|| AppError::BadRequest("Request must include a jsonString field".into()))?;

    tracing::info!("Starting DRE rule migration request");
    let flows = state.migration.migrate(&rule_set).await?;

    let first = flows
        .first()
        .ok_or_else(|| AppError::InternalError("Migration produced no flows".into()))?;
    tracing::info!(
        flow_count = flows.len(),
        file_name = %first.file_name,
        "DRE rule migration request completed"
    );

    Ok(Json(SuccessResponse::new(MigrateResponse {
        file_name: first.file_name.clone(),
        flow_content: first.flow_content.clone(),
        path: first.path.display().to_string(),
        flows,
    })))
}
