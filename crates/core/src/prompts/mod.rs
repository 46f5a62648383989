//! Prompt builders for the three translation passes.
//!
//! Each builder is a pure function from a [`Rule`] to the message list sent to
//! the completion endpoint: one system message describing the JSON the model
//! must return, one user message carrying the relevant part of the rule.

pub mod criteria;
pub mod results;
pub mod rule;

use serde::Serialize;

use crate::chat::ChatMessage;
use crate::error::CoreError;
use crate::model::Rule;

/// Prefix of the trailing context message appended to every prompt set.
pub const RULE_CONTEXT_PREFIX: &str = "Complete DRE Rule JSON for context:\n";

/// Pretty-print a prompt payload.
pub(crate) fn to_pretty_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, CoreError> {
    serde_json::to_string_pretty(payload)
        .map_err(|e| CoreError::Internal(format!("Failed to serialize prompt payload: {e}")))
}

/// User message carrying the whole (already validated) rule.
pub fn rule_context(rule: &Rule) -> Result<ChatMessage, CoreError> {
    Ok(ChatMessage::user(format!(
        "{RULE_CONTEXT_PREFIX}{}",
        to_pretty_json(rule)?
    )))
}
