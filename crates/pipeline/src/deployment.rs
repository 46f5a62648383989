//! Flow deployment: request validation, packaging, hand-off to a [`DeployTarget`].

use std::sync::Arc;

use serde::Serialize;

use dre2flow_core::error::CoreError;
use dre2flow_core::flow::{flow_api_name, FLOW_API_VERSION};
use dre2flow_salesforce::{build_flow_package, DeployResult, DeployTarget};

use crate::error::PipelineError;

/// A successful deployment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentOutcome {
    pub flow_api_name: String,
    pub result: DeployResult,
}

pub struct FlowDeployer {
    target: Arc<dyn DeployTarget>,
}

impl FlowDeployer {
    pub fn new(target: Arc<dyn DeployTarget>) -> Self {
        Self { target }
    }

    /// Deploy one flow file.
    ///
    /// The filename and content are checked before anything is sent to the
    /// target.
    pub async fn deploy_flow(
        &self,
        filename: &str,
        flow_content: &str,
    ) -> Result<DeploymentOutcome, PipelineError> {
        if filename.trim().is_empty() || flow_content.trim().is_empty() {
            return Err(CoreError::Validation(
                "Request must include filename and flowContent".into(),
            )
            .into());
        }
        let api_name = flow_api_name(filename)?;

        tracing::info!(flow_api_name = api_name, "Deploying flow");
        let package = build_flow_package(api_name, flow_content, FLOW_API_VERSION)?;

        let result = self.target.deploy(package).await.inspect_err(|e| {
            tracing::error!(flow_api_name = api_name, error = %e, "Flow deployment failed");
        })?;

        tracing::info!(
            flow_api_name = api_name,
            deploy_id = %result.id,
            status = %result.status,
            "Flow deployed"
        );
        Ok(DeploymentOutcome {
            flow_api_name: api_name.to_string(),
            result,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
