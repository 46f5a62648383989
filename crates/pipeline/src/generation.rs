//! Flow generation from translated rule instructions.
//!
//! One completion request per flow: the expert guide as system prompt, the
//! instructions as user message. The reply is decoded into a
//! [`FlowArtifact`] and written to the output directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use dre2flow_core::chat::ChatMessage;
use dre2flow_core::error::CoreError;
use dre2flow_core::flow::{decode_flow_reply, validate_flow_artifact, FlowArtifact};
use dre2flow_core::types::Timestamp;
use dre2flow_llm::{CompletionClient, CompletionOptions};

use crate::error::PipelineError;

/// Guide bundled with the crate, used when the configured guide is unreadable.
pub const BUNDLED_FLOW_GUIDE: &str = include_str!("../prompts/SalesforceFlowExpert.md");

/// Request sent next to the instructions.
pub const GENERATION_REQUEST: &str = "Generate a Salesforce Flow based on these instructions \
following the provided guide and output format requirements";

/// File locations used by [`FlowGenerator`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Markdown guide used as the system prompt.
    pub guide_path: PathBuf,
    /// Optional example flow appended to the system prompt.
    pub template_path: Option<PathBuf>,
    /// Directory generated flows are written to.
    pub output_dir: PathBuf,
}

/// A generated flow after it has been written to disk.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFlow {
    pub file_name: String,
    pub flow_content: String,
    pub path: PathBuf,
    pub generated_at: Timestamp,
}

pub struct FlowGenerator {
    client: Arc<dyn CompletionClient>,
    config: GeneratorConfig,
}

impl FlowGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, config: GeneratorConfig) -> Self {
        Self { client, config }
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Generate a flow and write it to `<output_dir>/<filename>`.
    pub async fn generate_and_save_flow(
        &self,
        instructions: &Value,
    ) -> Result<SavedFlow, PipelineError> {
        let artifact = self.generate_flow(instructions).await?;
        self.save_artifact(artifact).await
    }

    /// Write an already generated `artifact` and describe where it landed.
    pub async fn save_artifact(&self, artifact: FlowArtifact) -> Result<SavedFlow, PipelineError> {
        let path = self.save_flow(&artifact).await?;

        Ok(SavedFlow {
            file_name: artifact.filename,
            flow_content: artifact.flow_content,
            path,
            generated_at: chrono::Utc::now(),
        })
    }

    /// Ask the completion endpoint for a flow and validate the reply.
    ///
    /// Nothing is written; see [`Self::save_flow`].
    pub async fn generate_flow(&self, instructions: &Value) -> Result<FlowArtifact, PipelineError> {
        if !instructions.is_object() {
            return Err(CoreError::Validation("Invalid instructions provided".into()).into());
        }
        tracing::info!("Starting flow generation from instructions");

        let messages = [
            ChatMessage::system(self.system_prompt().await),
            ChatMessage::user(
                json!({
                    "instructions": instructions,
                    "request": GENERATION_REQUEST,
                })
                .to_string(),
            ),
        ];

        let reply = self
            .client
            .complete(&messages, &CompletionOptions::default())
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Flow generation request failed"))?;

        let artifact = decode_flow_reply(&reply).map_err(|e| {
            tracing::error!(error = %e, reply_len = reply.len(), "Invalid flow generation reply");
            PipelineError::from(e)
        })?;

        tracing::info!(filename = %artifact.filename, "Flow generation completed");
        Ok(artifact)
    }

    /// Write `artifact` into the output directory, creating it if needed.
    pub async fn save_flow(&self, artifact: &FlowArtifact) -> Result<PathBuf, PipelineError> {
        validate_flow_artifact(artifact)?;

        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let path = self.config.output_dir.join(&artifact.filename);
        tokio::fs::write(&path, &artifact.flow_content)
            .await
            .inspect_err(|e| {
                tracing::error!(path = %path.display(), error = %e, "Failed to save flow");
            })?;

        tracing::info!(path = %path.display(), "Flow saved");
        Ok(path)
    }

    /// The guide, plus the reference template when one is configured.
    async fn system_prompt(&self) -> String {
        let mut prompt = match tokio::fs::read_to_string(&self.config.guide_path).await {
            Ok(guide) => guide,
            Err(e) => {
                tracing::error!(
                    path = %self.config.guide_path.display(),
                    error = %e,
                    "Error loading flow guide, using bundled guide"
                );
                BUNDLED_FLOW_GUIDE.to_string()
            }
        };

        if let Some(template_path) = &self.config.template_path {
            match tokio::fs::read_to_string(template_path).await {
                Ok(template) => {
                    prompt.push_str("\n\n## Reference flow template\n\n```xml\n");
                    prompt.push_str(template.trim_end());
                    prompt.push_str("\n```\n");
                }
                Err(e) => tracing::warn!(
                    path = %template_path.display(),
                    error = %e,
                    "Flow template not readable, continuing without it"
                ),
            }
        }

        prompt
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
