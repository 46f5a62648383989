//! Handlers translating the configured input rule set.
//!
//! Both endpoints read `DRE_INPUT_PATH`, validate the rule set (dropping
//! inactive filters) and translate each rule.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use dre2flow_core::error::CoreError;
use dre2flow_core::model::{parse_rule_set, Rule};
use dre2flow_core::validation::validate_and_process_rules;
use dre2flow_pipeline::{PipelineError, RuleTranslation};

use crate::error::AppResult;
use crate::response::SuccessResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TranslationsResponse {
    pub translations: Vec<RuleTranslation>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load, parse and validate the input rule set.
async fn load_input_rules(state: &AppState) -> AppResult<Vec<Rule>> {
    let path = &state.config.input_path;
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to read DRE input file");
        PipelineError::from(e)
    })?;

    let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
        CoreError::Validation(format!("DRE input file is not valid JSON: {e}"))
    })?;
    let rules = parse_rule_set(&value)?;
    Ok(validate_and_process_rules(&rules)?)
}

// ---------------------------------------------------------------------------
// GET /translate-dre-rule
// ---------------------------------------------------------------------------

/// Translate the filter groups of every input rule.
pub async fn translate_dre_rule(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let rules = load_input_rules(&state).await?;
    let translations = state.translator.translate_criteria(&rules).await?;
    Ok(Json(SuccessResponse::new(TranslationsResponse { translations })))
}

// ---------------------------------------------------------------------------
// GET /translate-dre-results
// ---------------------------------------------------------------------------

/// Translate the result groups of every input rule.
pub async fn translate_dre_results(
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rules = load_input_rules(&state).await?;
    let translations = state.translator.translate_results(&rules).await?;
    Ok(Json(SuccessResponse::new(TranslationsResponse { translations })))
}
