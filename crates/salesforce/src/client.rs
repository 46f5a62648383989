//! Metadata API client.
//!
//! Each deploy logs in afresh; no session is cached between calls.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use tokio::time::Instant;

use crate::error::SalesforceError;
use crate::result::DeployResult;
use crate::soap::{self, LoginSession};

/// Connection settings for the target org.
#[derive(Debug, Clone)]
pub struct SalesforceConfig {
    /// Login host, e.g. `https://login.salesforce.com` or `https://test.salesforce.com`.
    pub login_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Appended to the password on login.
    pub security_token: Option<String>,
    pub api_version: String,
    /// Seconds between status checks; values below one are raised to one.
    pub poll_interval_secs: u64,
    pub deploy_timeout_secs: u64,
}

impl SalesforceConfig {
    /// True when username and password are both present.
    pub fn is_configured(&self) -> bool {
        self.username.as_deref().is_some_and(|u| !u.is_empty())
            && self.password.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Delay between `checkDeployStatus` calls, never shorter than one second.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

/// Something that accepts a deploy zip and reports the outcome.
#[async_trait]
pub trait DeployTarget: Send + Sync {
    /// Deploy `package` (a zip with `package.xml`) and wait for completion.
    ///
    /// Returns the final result on success; an unsuccessful deployment is a
    /// [`SalesforceError::Deploy`] listing the component problems.
    async fn deploy(&self, package: Vec<u8>) -> Result<DeployResult, SalesforceError>;
}

/// SOAP client for the partner login and metadata deploy calls.
pub struct SalesforceClient {
    client: reqwest::Client,
    config: SalesforceConfig,
}

impl SalesforceClient {
    pub fn new(config: SalesforceConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: SalesforceConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &SalesforceConfig {
        &self.config
    }

    /// Log in with username and password + security token.
    pub async fn login(&self) -> Result<LoginSession, SalesforceError> {
        let username = self
            .config
            .username
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(SalesforceError::NotConfigured("SF_USERNAME is not set"))?;
        let password = self
            .config
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(SalesforceError::NotConfigured("SF_PASSWORD is not set"))?;
        let token = self.config.security_token.as_deref().unwrap_or_default();

        let url = format!(
            "{}/services/Soap/u/{}",
            self.config.login_url.trim_end_matches('/'),
            self.config.api_version
        );
        let body = soap::login_envelope(username, &format!("{password}{token}"));

        let response = self.soap_call(&url, "login", body).await?;
        let session = soap::parse_login_response(&response)?;

        tracing::info!(server_url = %session.server_url, "Logged in to Salesforce");
        Ok(session)
    }

    /// Start a deployment and return its async process id.
    async fn start_deploy(
        &self,
        session: &LoginSession,
        package: &[u8],
    ) -> Result<String, SalesforceError> {
        let zip_base64 = base64::engine::general_purpose::STANDARD.encode(package);
        let body = soap::deploy_envelope(&session.session_id, &zip_base64);
        let response = self
            .soap_call(&session.metadata_server_url, "deploy", body)
            .await?;
        soap::parse_deploy_id(&response)
    }

    async fn check_status(
        &self,
        session: &LoginSession,
        id: &str,
    ) -> Result<DeployResult, SalesforceError> {
        let body = soap::check_deploy_status_envelope(&session.session_id, id);
        let response = self
            .soap_call(&session.metadata_server_url, "checkDeployStatus", body)
            .await?;
        soap::parse_deploy_result(&response)
    }

    /// Poll `checkDeployStatus` until the deployment is done or the deadline passes.
    async fn wait_for_deploy(
        &self,
        session: &LoginSession,
        id: &str,
    ) -> Result<DeployResult, SalesforceError> {
        let interval = self.config.poll_interval();
        let deadline = Instant::now() + Duration::from_secs(self.config.deploy_timeout_secs);

        loop {
            let result = self.check_status(session, id).await?;
            tracing::debug!(
                deploy_id = %id,
                status = %result.status,
                deployed = result.number_components_deployed,
                total = result.number_components_total,
                "Polled deployment status"
            );
            if result.done {
                return Ok(result);
            }
            if Instant::now() + interval > deadline {
                return Err(SalesforceError::Timeout {
                    id: id.to_string(),
                    waited_secs: self.config.deploy_timeout_secs,
                });
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// POST a SOAP envelope and return the response body.
    ///
    /// A SOAP fault in the body takes precedence over the HTTP status.
    async fn soap_call(
        &self,
        url: &str,
        action: &str,
        body: String,
    ) -> Result<String, SalesforceError> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=UTF-8")
            .header("SOAPAction", action)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if let Some(fault) = soap::parse_fault(&text) {
            return Err(SalesforceError::Fault(fault));
        }
        if !status.is_success() {
            return Err(SalesforceError::Fault(format!(
                "{action} returned HTTP {}: {text}",
                status.as_u16()
            )));
        }
        Ok(text)
    }
}

#[async_trait]
impl DeployTarget for SalesforceClient {
    async fn deploy(&self, package: Vec<u8>) -> Result<DeployResult, SalesforceError> {
        let session = self.login().await?;
        let id = self.start_deploy(&session, &package).await?;
        tracing::info!(deploy_id = %id, "Deployment started");

        let result = self.wait_for_deploy(&session, &id).await?;
        if !result.success {
            let problems = result.problems();
            let message = if problems.is_empty() {
                format!("status {}", result.status)
            } else {
                problems
            };
            tracing::error!(
                deploy_id = %id,
                status = %result.status,
                problems = %message,
                "Deployment failed"
            );
            return Err(SalesforceError::Deploy(message));
        }

        tracing::info!(
            deploy_id = %id,
            components = result.number_components_deployed,
            "Deployment succeeded"
        );
        Ok(result)
    }
}
