use dre2flow_core::error::CoreError;
use dre2flow_llm::LlmError;
use dre2flow_salesforce::SalesforceError;

/// Errors from any pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Salesforce(#[from] SalesforceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
