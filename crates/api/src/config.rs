use std::path::PathBuf;

use dre2flow_llm::LlmConfig;
use dre2flow_pipeline::GeneratorConfig;
use dre2flow_salesforce::SalesforceConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. Built once in
/// `main` and handed to every component that needs part of it.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `600`).
    pub request_timeout_secs: u64,
    /// Directory served for unmatched routes (default: `public`).
    pub static_dir: PathBuf,
    /// Rule set read by the translation endpoints.
    pub input_path: PathBuf,
    pub llm: LlmConfig,
    pub generator: GeneratorConfig,
    pub salesforce: SalesforceConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                           |
    /// |--------------------------------|-----------------------------------|
    /// | `HOST`                         | `0.0.0.0`                         |
    /// | `PORT`                         | `3000`                            |
    /// | `CORS_ORIGINS`                 | `http://localhost:3000`           |
    /// | `REQUEST_TIMEOUT_SECS`         | `600`                             |
    /// | `STATIC_DIR`                   | `public`                          |
    /// | `DRE_INPUT_PATH`               | `input/dre-rule.json`             |
    /// | `LITELLM_API_BASE`             | unset                             |
    /// | `LITELLM_API_KEY`              | unset                             |
    /// | `LITELLM_MODEL`                | `gpt-4o`                          |
    /// | `LITELLM_TIMEOUT_SECS`         | `300`                             |
    /// | `FLOW_GUIDE_PATH`              | `prompts/SalesforceFlowExpert.md` |
    /// | `FLOW_TEMPLATE_PATH`           | unset                             |
    /// | `FLOW_OUTPUT_DIR`              | `dre-2-sf-flows/flows`            |
    /// | `SF_LOGIN_URL`                 | `https://login.salesforce.com`    |
    /// | `SF_USERNAME`                  | unset                             |
    /// | `SF_PASSWORD`                  | unset                             |
    /// | `SF_SECURITY_TOKEN`            | unset                             |
    /// | `SF_API_VERSION`               | `62.0`                            |
    /// | `SF_DEPLOY_POLL_INTERVAL_SECS` | `2`                               |
    /// | `SF_DEPLOY_TIMEOUT_SECS`       | `600`                             |
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "600")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let llm = LlmConfig {
            api_base: env_opt("LITELLM_API_BASE"),
            api_key: env_opt("LITELLM_API_KEY"),
            model: env_or("LITELLM_MODEL", "gpt-4o"),
            timeout_secs: env_or("LITELLM_TIMEOUT_SECS", "300")
                .parse()
                .expect("LITELLM_TIMEOUT_SECS must be a valid u64"),
        };

        let generator = GeneratorConfig {
            guide_path: env_or("FLOW_GUIDE_PATH", "prompts/SalesforceFlowExpert.md").into(),
            template_path: env_opt("FLOW_TEMPLATE_PATH").map(PathBuf::from),
            output_dir: env_or("FLOW_OUTPUT_DIR", "dre-2-sf-flows/flows").into(),
        };

        let salesforce = SalesforceConfig {
            login_url: env_or("SF_LOGIN_URL", "https://login.salesforce.com"),
            username: env_opt("SF_USERNAME"),
            password: env_opt("SF_PASSWORD"),
            security_token: env_opt("SF_SECURITY_TOKEN"),
            api_version: env_or("SF_API_VERSION", "62.0"),
            poll_interval_secs: env_or("SF_DEPLOY_POLL_INTERVAL_SECS", "2")
                .parse()
                .expect("SF_DEPLOY_POLL_INTERVAL_SECS must be a valid u64"),
            deploy_timeout_secs: env_or("SF_DEPLOY_TIMEOUT_SECS", "600")
                .parse()
                .expect("SF_DEPLOY_TIMEOUT_SECS must be a valid u64"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            static_dir: env_or("STATIC_DIR", "public").into(),
            input_path: env_or("DRE_INPUT_PATH", "input/dre-rule.json").into(),
            llm,
            generator,
            salesforce,
        }
    }

    /// Names of unset settings the server can start without but will need.
    pub fn missing_llm_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.llm.api_key.is_none() {
            missing.push("LITELLM_API_KEY");
        }
        if self.llm.api_base.is_none() {
            missing.push("LITELLM_API_BASE");
        }
        missing
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

/// Value of `key`, treating an empty variable as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
