//! In-memory stand-ins for the completion endpoint and the deploy target.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use dre2flow_core::chat::{ChatMessage, Role};
use dre2flow_llm::{CompletionClient, CompletionOptions, LlmError};
use dre2flow_salesforce::{DeployResult, DeployTarget, SalesforceError};

pub const VALID_FLOW_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Flow xmlns="http://soap.sforce.com/2006/04/metadata">
    <apiVersion>62.0</apiVersion>
    <label>Route Hot Leads</label>
    <processType>AutoLaunchedFlow</processType>
    <status>Active</status>
</Flow>"#;

/// Which prompt set a request belongs to, judged by its system message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Rule,
    Criteria,
    Results,
    Flow,
}

pub fn prompt_kind(messages: &[ChatMessage]) -> PromptKind {
    let system = messages
        .iter()
        .find(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .unwrap_or_default();
    if system.contains("DRE Rule expert") {
        PromptKind::Rule
    } else if system.contains("decision criteria") {
        PromptKind::Criteria
    } else if system.contains("data operations expert") {
        PromptKind::Results
    } else {
        PromptKind::Flow
    }
}

/// Scripted completion client that records every request.
pub struct FakeCompletion {
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
    pub flow_reply: String,
    pub fail_on: Option<PromptKind>,
    /// Flow requests beyond this many are answered with an error.
    pub flow_limit: Option<usize>,
    flows_served: AtomicUsize,
}

impl FakeCompletion {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            flow_reply: json!({
                "filename": "Route_Hot_Leads.flow-meta.xml",
                "flowContent": VALID_FLOW_XML,
            })
            .to_string(),
            fail_on: None,
            flow_limit: None,
            flows_served: AtomicUsize::new(0),
        }
    }

    pub fn with_flow_reply(reply: impl Into<String>) -> Self {
        Self {
            flow_reply: reply.into(),
            ..Self::new()
        }
    }

    pub fn failing_on(kind: PromptKind) -> Self {
        Self {
            fail_on: Some(kind),
            ..Self::new()
        }
    }

    pub fn failing_after_flows(limit: usize) -> Self {
        Self {
            flow_limit: Some(limit),
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for FakeCompletion {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(messages.to_vec());

        let kind = prompt_kind(messages);
        let over_limit = kind == PromptKind::Flow
            && self
                .flow_limit
                .is_some_and(|limit| self.flows_served.fetch_add(1, Ordering::SeqCst) >= limit);
        if self.fail_on == Some(kind) || over_limit {
            return Err(LlmError::Api {
                status: 503,
                body: "upstream unavailable".into(),
            });
        }

        Ok(match kind {
            PromptKind::Rule => json!({ "ruleName": "Route Hot Leads" }).to_string(),
            PromptKind::Criteria => {
                format!("```json\n{}\n```", json!([{ "logicOperator": "AND" }]))
            }
            PromptKind::Results => json!([{ "operationType": "update" }]).to_string(),
            PromptKind::Flow => self.flow_reply.clone(),
        })
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

/// Deploy target that records packages and returns a fixed outcome.
pub struct FakeDeployTarget {
    pub calls: AtomicUsize,
    pub packages: Mutex<Vec<Vec<u8>>>,
    pub fail_with: Option<String>,
}

impl FakeDeployTarget {
    pub fn succeeding() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            packages: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    pub fn failing(problems: &str) -> Self {
        Self {
            fail_with: Some(problems.to_string()),
            ..Self::succeeding()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeployTarget for FakeDeployTarget {
    async fn deploy(&self, package: Vec<u8>) -> Result<DeployResult, SalesforceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.packages.lock().unwrap().push(package);
        if let Some(problems) = &self.fail_with {
            return Err(SalesforceError::Deploy(problems.clone()));
        }
        Ok(DeployResult {
            id: "0Af000000000001".into(),
            done: true,
            success: true,
            status: "Succeeded".into(),
            number_components_deployed: 1,
            number_components_total: 1,
            ..Default::default()
        })
    }
}
