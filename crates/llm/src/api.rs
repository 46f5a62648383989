//! REST client for the `/chat/completions` endpoint.
//!
//! Wraps a LiteLLM (OpenAI-compatible) proxy using [`reqwest`]. One call per
//! prompt set; no retry, the caller decides what a failure means.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use dre2flow_core::chat::ChatMessage;

/// Connection settings for the completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of the proxy, e.g. `http://localhost:4000`.
    pub api_base: Option<String>,
    /// Bearer token sent in the `Authorization` header.
    pub api_key: Option<String>,
    /// Model identifier passed through to the proxy.
    pub model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Sampling options for a single completion request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionOptions {
    /// Low temperature and a bounded reply for the structured translation passes.
    pub const TRANSLATION: Self = Self {
        temperature: Some(0.2),
        max_tokens: Some(2000),
    };
}

/// Errors from the completion client.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint returned a non-2xx status code.
    #[error("Completion API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The reply contained no choices or an empty message.
    #[error("Completion API returned no content")]
    EmptyResponse,

    /// Required connection settings are missing.
    #[error("Completion client is not configured: {0}")]
    NotConfigured(&'static str),
}

/// Anything that can turn a message list into the assistant's reply text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `messages` and return the content of the first choice.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, LlmError>;

    /// Model identifier used for requests.
    fn model(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Subset of the OpenAI chat completion response the client reads.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if present and non-empty.
    pub fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// LiteLlmClient
// ---------------------------------------------------------------------------

/// HTTP client for a LiteLLM proxy.
pub struct LiteLlmClient {
    client: reqwest::Client,
    api_base: Option<String>,
    api_key: Option<String>,
    model: String,
}

impl LiteLlmClient {
    /// Create a client with its own connection pool and request timeout.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &LlmConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// Full URL of the completions endpoint.
    pub fn completions_url(&self) -> Result<String, LlmError> {
        let base = self
            .api_base
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .ok_or(LlmError::NotConfigured("LITELLM_API_BASE is not set"))?;
        Ok(format!("{}/chat/completions", base.trim_end_matches('/')))
    }

    /// Ensure the response has a success status code, returning a
    /// [`LlmError::Api`] with the body text otherwise.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl CompletionClient for LiteLlmClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        let url = self.completions_url()?;
        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        tracing::debug!(
            model = %self.model,
            message_count = messages.len(),
            "Sending completion request"
        );

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = self.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = match request.send().await {
            Ok(response) => Self::ensure_success(response).await,
            Err(e) => Err(LlmError::Request(e)),
        };
        let response = response.inspect_err(|e| {
            tracing::error!(model = %self.model, error = %e, "Completion request failed");
        })?;

        let parsed: ChatCompletionResponse = response.json().await?;
        let content = parsed.into_content().ok_or(LlmError::EmptyResponse)?;

        tracing::debug!(reply_len = content.len(), "Completion received");
        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_base: Option<&str>) -> LlmConfig {
        LlmConfig {
            api_base: api_base.map(String::from),
            api_key: Some("sk-test".into()),
            model: "gpt-4o".into(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn completions_url_joins_without_double_slash() {
        let client = LiteLlmClient::new(&config(Some("http://proxy:4000/"))).unwrap();
        assert_eq!(
            client.completions_url().unwrap(),
            "http://proxy:4000/chat/completions"
        );
    }

    #[test]
    fn missing_base_url_is_not_configured() {
        let client = LiteLlmClient::new(&config(None)).unwrap();
        let err = client.completions_url().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Completion client is not configured: LITELLM_API_BASE is not set"
        );
    }

    #[test]
    fn request_omits_unset_options() {
        let messages = [ChatMessage::user("Say hello world")];
        let body = ChatCompletionRequest {
            model: "gpt-4o",
            messages: &messages,
            temperature: None,
            max_tokens: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-4o",
                "messages": [{ "role": "user", "content": "Say hello world" }]
            })
        );
    }

    #[test]
    fn translation_options_are_serialized() {
        let messages = [ChatMessage::system("s")];
        let body = ChatCompletionRequest {
            model: "m",
            messages: &messages,
            temperature: CompletionOptions::TRANSLATION.temperature,
            max_tokens: CompletionOptions::TRANSLATION.max_tokens,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["max_tokens"], 2000);
        assert!((json["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn empty_choices_have_no_content() {
        let parsed: ChatCompletionResponse =
            serde_json::from_value(serde_json::json!({ "choices": [] })).unwrap();
        assert!(parsed.into_content().is_none());
    }

    #[test]
    fn api_error_display() {
        let err = LlmError::Api {
            status: 401,
            body: "invalid key".into(),
        };
        assert_eq!(err.to_string(), "Completion API error (401): invalid key");
    }
}
