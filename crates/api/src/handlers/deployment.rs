//! Handler for deploying a generated flow to Salesforce.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use dre2flow_salesforce::DeployResult;

use crate::error::{AppError, AppResult};
use crate::response::SuccessResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DeployRequest {
    #[serde(default)]
    pub filename: String,
    #[serde(rename = "flowContent", default)]
    pub flow_content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResponse {
    pub message: &'static str,
    pub flow_api_name: String,
    pub deployment_result: DeployResult,
}

// ---------------------------------------------------------------------------
// GET|POST /deploy-flow
// ---------------------------------------------------------------------------

/// Deploy one flow file.
///
/// Accepts the body on GET as well as POST; an empty body is treated as a
/// request with no fields, which fails validation.
pub async fn deploy_flow(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let request: DeployRequest = if body.is_empty() {
        DeployRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?
    };

    let outcome = state
        .deployer
        .deploy_flow(&request.filename, &request.flow_content)
        .await?;

    Ok(Json(SuccessResponse::new(DeployResponse {
        message: "Flow deployed successfully",
        flow_api_name: outcome.flow_api_name,
        deployment_result: outcome.result,
    })))
}
