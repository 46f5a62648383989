use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use dre2flow_core::error::CoreError;
use dre2flow_llm::LlmError;
use dre2flow_pipeline::PipelineError;
use dre2flow_salesforce::SalesforceError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`PipelineError`] for stage failures and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses of
/// the form `{ success: false, error, code, details? }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A failure from any pipeline stage.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        Self::Pipeline(err.into())
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        Self::Pipeline(err.into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Status, stable code, message and optional cause for an error response.
type Classified = (StatusCode, &'static str, String, Option<String>);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::Pipeline(err) => classify_pipeline_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let mut body = json!({
            "success": false,
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, axum::Json(body)).into_response()
    }
}

fn classify_pipeline_error(err: &PipelineError) -> Classified {
    match err {
        // --- CoreError variants ---
        PipelineError::Core(CoreError::Validation(msg)) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
        }
        PipelineError::Core(CoreError::MalformedResponse(msg)) => {
            tracing::error!(error = %msg, "Malformed LLM response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "MALFORMED_LLM_RESPONSE",
                "Invalid response format from LLM".to_string(),
                Some(msg.clone()),
            )
        }
        PipelineError::Core(CoreError::Internal(msg)) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }

        // --- Completion endpoint ---
        PipelineError::Llm(LlmError::NotConfigured(what)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "CONFIGURATION_ERROR",
            format!("LiteLLM is not configured: {what}"),
            None,
        ),
        PipelineError::Llm(llm) => {
            tracing::error!(error = %llm, "LiteLLM request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "LLM_ERROR",
                "Failed to connect to LiteLLM".to_string(),
                Some(llm.to_string()),
            )
        }

        // --- Deployment ---
        PipelineError::Salesforce(SalesforceError::NotConfigured(what)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "CONFIGURATION_ERROR",
            format!("Salesforce is not configured: {what}"),
            None,
        ),
        PipelineError::Salesforce(sf @ SalesforceError::Deploy(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "DEPLOYMENT_ERROR",
            sf.to_string(),
            None,
        ),
        PipelineError::Salesforce(sf) => {
            tracing::error!(error = %sf, "Salesforce deployment error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DEPLOYMENT_ERROR",
                "Failed to deploy flow".to_string(),
                Some(sf.to_string()),
            )
        }

        // --- Filesystem ---
        PipelineError::Io(io) => {
            tracing::error!(error = %io, "I/O error");
            internal()
        }
    }
}

fn internal() -> Classified {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
        None,
    )
}
