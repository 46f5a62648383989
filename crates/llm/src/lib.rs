//! Client for an OpenAI-compatible chat-completion endpoint (LiteLLM proxy).
//!
//! [`LiteLlmClient`] talks HTTP; the [`CompletionClient`] trait is the seam
//! the pipeline depends on so translation and generation can run against
//! any implementation.

pub mod api;

pub use api::{CompletionClient, CompletionOptions, LiteLlmClient, LlmConfig, LlmError};
