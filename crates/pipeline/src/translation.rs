//! Rule translation through the completion endpoint.
//!
//! Builds the prompt sets from [`dre2flow_core::prompts`], sends them with the
//! translation sampling options and decodes each reply as JSON.

use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;
use serde_json::Value;

use dre2flow_core::chat::ChatMessage;
use dre2flow_core::error::CoreError;
use dre2flow_core::model::{Rule, TranslatedRule};
use dre2flow_core::prompts;
use dre2flow_core::reply::parse_json_reply;
use dre2flow_llm::{CompletionClient, CompletionOptions};

use crate::error::PipelineError;

/// Translation of one rule's criteria or results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTranslation {
    pub rule_name: String,
    pub translation: Value,
}

type PromptBuilder = fn(&Rule) -> Result<Vec<ChatMessage>, CoreError>;

pub struct RuleTranslator {
    client: Arc<dyn CompletionClient>,
}

impl RuleTranslator {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Translate the rule summary, criteria and results of one rule.
    ///
    /// The three requests run concurrently, each followed by the full rule as
    /// context. The first failure is returned and the other requests dropped.
    pub async fn translate_rule(&self, rule: &Rule) -> Result<TranslatedRule, PipelineError> {
        let rule_name = rule.display_name();
        tracing::info!(rule_name, "Translating DRE rule");

        let context = prompts::rule_context(rule)?;
        let with_context = |mut messages: Vec<ChatMessage>| {
            messages.push(context.clone());
            messages
        };
        let rule_prompts = with_context(prompts::rule::generate_prompts(rule)?);
        let criteria_prompts = with_context(prompts::criteria::generate_prompts(rule)?);
        let result_prompts = with_context(prompts::results::generate_prompts(rule)?);

        let (rule_value, criteria, results) = tokio::try_join!(
            self.request_json(&rule_prompts, "rule"),
            self.request_json(&criteria_prompts, "criteria"),
            self.request_json(&result_prompts, "results"),
        )
        .inspect_err(|e| tracing::error!(rule_name, error = %e, "DRE rule translation failed"))?;

        tracing::info!(rule_name, "DRE rule translation completed");
        Ok(TranslatedRule {
            rule: rule_value,
            criteria,
            results,
        })
    }

    /// Translate the filter groups of each rule.
    pub async fn translate_criteria(
        &self,
        rules: &[Rule],
    ) -> Result<Vec<RuleTranslation>, PipelineError> {
        self.translate_each(rules, "criteria", prompts::criteria::generate_prompts)
            .await
    }

    /// Translate the result groups of each rule.
    pub async fn translate_results(
        &self,
        rules: &[Rule],
    ) -> Result<Vec<RuleTranslation>, PipelineError> {
        self.translate_each(rules, "results", prompts::results::generate_prompts)
            .await
    }

    async fn translate_each(
        &self,
        rules: &[Rule],
        stage: &'static str,
        build: PromptBuilder,
    ) -> Result<Vec<RuleTranslation>, PipelineError> {
        tracing::info!(stage, rule_count = rules.len(), "Translating DRE rules");

        try_join_all(rules.iter().map(|rule| async move {
            let messages = build(rule)?;
            let translation = self.request_json(&messages, stage).await?;
            Ok::<_, PipelineError>(RuleTranslation {
                rule_name: rule.display_name().to_string(),
                translation,
            })
        }))
        .await
    }

    async fn request_json(
        &self,
        messages: &[ChatMessage],
        stage: &'static str,
    ) -> Result<Value, PipelineError> {
        let reply = self
            .client
            .complete(messages, &CompletionOptions::TRANSLATION)
            .await
            .inspect_err(|e| tracing::error!(stage, error = %e, "Completion request failed"))?;

        parse_json_reply(&reply).map_err(|e| {
            tracing::error!(stage, error = %e, reply_len = reply.len(), "Failed to parse LLM reply");
            PipelineError::from(e)
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
