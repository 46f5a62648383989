#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use dre2flow_api::config::ServerConfig;
use dre2flow_api::router::build_app_router;
use dre2flow_api::state::AppState;
use dre2flow_core::chat::{ChatMessage, Role};
use dre2flow_llm::{CompletionClient, CompletionOptions, LlmConfig, LlmError};
use dre2flow_pipeline::GeneratorConfig;
use dre2flow_salesforce::{DeployResult, DeployTarget, SalesforceConfig, SalesforceError};

pub const VALID_FLOW_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Flow xmlns="http://soap.sforce.com/2006/04/metadata">
    <apiVersion>62.0</apiVersion>
    <label>Route Hot Leads</label>
    <processType>AutoLaunchedFlow</processType>
    <status>Active</status>
</Flow>"#;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Completion client answering by prompt set and recording every request.
#[derive(Default)]
pub struct FakeLlm {
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
    pub fail: bool,
}

impl FakeLlm {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Every message content sent so far.
    pub fn sent_contents(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .map(|m| m.content.clone())
            .collect()
    }
}

#[async_trait]
impl CompletionClient for FakeLlm {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        if self.fail {
            return Err(LlmError::Api {
                status: 502,
                body: "bad gateway".into(),
            });
        }

        let system = messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let reply = if system.contains("DRE Rule expert") {
            json!({ "ruleName": "Route Hot Leads" })
        } else if system.contains("decision criteria") {
            json!([{ "logicOperator": "AND" }])
        } else if system.contains("data operations expert") {
            json!([{ "operationType": "update" }])
        } else if messages.len() == 1 {
            return Ok("Hello world".to_string());
        } else {
            json!({
                "filename": "Route_Hot_Leads.flow-meta.xml",
                "flowContent": VALID_FLOW_XML,
            })
        };
        Ok(reply.to_string())
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

/// Deploy target recording calls and returning a fixed outcome.
#[derive(Default)]
pub struct FakeDeployTarget {
    pub calls: AtomicUsize,
    pub fail_with: Option<String>,
}

impl FakeDeployTarget {
    pub fn failing(problems: &str) -> Self {
        Self {
            fail_with: Some(problems.to_string()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeployTarget for FakeDeployTarget {
    async fn deploy(&self, _package: Vec<u8>) -> Result<DeployResult, SalesforceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
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

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` whose files all live under `dir`.
pub fn test_config(dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        static_dir: dir.join("public"),
        input_path: dir.join("input/dre-rule.json"),
        llm: LlmConfig {
            api_base: Some("http://127.0.0.1:4000".into()),
            api_key: Some("sk-test".into()),
            model: "fake-model".into(),
            timeout_secs: 5,
        },
        generator: GeneratorConfig {
            guide_path: dir.join("prompts/SalesforceFlowExpert.md"),
            template_path: None,
            output_dir: dir.join("flows"),
        },
        salesforce: SalesforceConfig {
            login_url: "https://login.salesforce.com".into(),
            username: None,
            password: None,
            security_token: None,
            api_version: "62.0".into(),
            poll_interval_secs: 0,
            deploy_timeout_secs: 5,
        },
    }
}

/// Build the full application router around the given fakes.
pub fn build_test_app(
    dir: &Path,
    llm: Arc<FakeLlm>,
    deploy_target: Arc<FakeDeployTarget>,
) -> Router {
    let config = test_config(dir);
    let state = AppState::new(Arc::new(config.clone()), llm, deploy_target);
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> Response<Body> {
    send_raw(app, Method::POST, uri, body.to_string()).await
}

pub async fn send_raw(app: Router, method: Method, uri: &str, body: String) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// An Automation rule with one active and one inactive filter.
pub fn lead_rule(rule_type: &str) -> Value {
    json!({
        "Name": "Route Hot Leads",
        "DRE__Type__c": rule_type,
        "DRE__Object_Name__c": "Lead",
        "DRE__DRE_Filter_Groups__r": { "records": [{ "Id": "g1", "DRE__Condition__c": "AND" }] },
        "DRE__DRE_Filters__r": { "records": [
            { "Id": "f1", "DRE__DRE_Group__c": "g1", "DRE__IsActive__c": true,
              "DRE__Field__c": "Rating", "DRE__Operator__c": "equals", "DRE__Value__c": "Hot" },
            { "Id": "f2", "DRE__DRE_Group__c": "g1", "DRE__IsActive__c": false,
              "DRE__Field__c": "INACTIVE_Status", "DRE__Operator__c": "equals" }
        ]},
        "DRE__DRE_Result_Groups__r": { "records": [{ "Id": "rg1", "Name": "Assign" }] },
        "DRE__DRE_Results__r": { "records": [
            { "Id": "r1", "DRE__DRE_Group__c": "rg1", "DRE__IsActive__c": true,
              "DRE__Field__c": "OwnerId" }
        ]}
    })
}
