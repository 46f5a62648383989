//! End-to-end migration of an uploaded rule set into saved flows.

use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::Value;

use dre2flow_core::error::CoreError;
use dre2flow_core::flow::{validate_flow_artifact, FlowArtifact};
use dre2flow_core::model::{parse_rule_set, Rule};
use dre2flow_core::validation::validate_and_process_rules;

use crate::error::PipelineError;
use crate::generation::{FlowGenerator, SavedFlow};
use crate::translation::RuleTranslator;

pub struct MigrationPipeline {
    translator: Arc<RuleTranslator>,
    generator: Arc<FlowGenerator>,
}

impl MigrationPipeline {
    pub fn new(translator: Arc<RuleTranslator>, generator: Arc<FlowGenerator>) -> Self {
        Self {
            translator,
            generator,
        }
    }

    /// Parse, validate, translate and generate one flow per rule.
    ///
    /// Validation covers the whole batch before any request is made. Rules
    /// are then translated and generated concurrently; the first failure is
    /// returned. Files are written only once every rule has a valid flow, so
    /// a failed batch leaves the output directory untouched.
    pub async fn migrate(&self, rule_set: &Value) -> Result<Vec<SavedFlow>, PipelineError> {
        let rules = parse_rule_set(rule_set)?;
        let rules = validate_and_process_rules(&rules)?;

        tracing::info!(rule_count = rules.len(), "Starting DRE rule migration");
        let artifacts = try_join_all(rules.iter().map(|rule| self.generate_for_rule(rule))).await?;

        let mut flows = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            flows.push(self.generator.save_artifact(artifact).await?);
        }
        tracing::info!(flow_count = flows.len(), "DRE rule migration completed");

        Ok(flows)
    }

    async fn generate_for_rule(&self, rule: &Rule) -> Result<FlowArtifact, PipelineError> {
        let translated = self.translator.translate_rule(rule).await?;
        let instructions = serde_json::to_value(&translated).map_err(|e| {
            CoreError::Internal(format!("Failed to serialize translated rule: {e}"))
        })?;
        let artifact = self.generator.generate_flow(&instructions).await?;
        validate_flow_artifact(&artifact)?;
        Ok(artifact)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
