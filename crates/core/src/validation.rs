//! Rule validation and inactive-record filtering.
//!
//! Runs before any translation: the whole batch is rejected if a single rule
//! has an unsupported type, and inactive filters are stripped so no later
//! stage can see them.

use serde_json::Value;

use crate::error::CoreError;
use crate::model::{GroupMember, Rule, SUPPORTED_RULE_TYPE};

/// Reject the batch if any rule's type is not exactly the string
/// [`SUPPORTED_RULE_TYPE`].
pub fn validate_rule_types(rules: &[Rule]) -> Result<(), CoreError> {
    for rule in rules {
        let label = match &rule.rule_type {
            Some(Value::String(t)) if t == SUPPORTED_RULE_TYPE => continue,
            Some(Value::String(t)) => t.clone(),
            Some(other) => other.to_string(),
            None => "undefined".to_string(),
        };
        return Err(CoreError::Validation(format!(
            "Currently, \"{label}\" rule type is not supported. Only {SUPPORTED_RULE_TYPE} type is supported."
        )));
    }
    Ok(())
}

/// Copy `rules`, keeping only active records in each rule's filter list.
///
/// Every other field, including result records, is left untouched.
pub fn filter_inactive_records(rules: &[Rule]) -> Vec<Rule> {
    rules
        .iter()
        .map(|rule| {
            let mut processed = rule.clone();
            if let Some(filters) = processed.filters.as_mut().and_then(Option::as_mut) {
                filters.records.retain(|f| f.is_active());
            }
            processed
        })
        .collect()
}

/// Validate rule types, then strip inactive filters.
///
/// All-or-nothing: an unsupported rule anywhere in the batch fails the call
/// before any filtering happens.
pub fn validate_and_process_rules(rules: &[Rule]) -> Result<Vec<Rule>, CoreError> {
    tracing::debug!(rule_count = rules.len(), "Validating DRE rules");

    if let Err(e) = validate_rule_types(rules) {
        tracing::error!(error = %e, "DRE rule validation failed");
        return Err(e);
    }

    let processed = filter_inactive_records(rules);

    let removed: usize = rules
        .iter()
        .zip(&processed)
        .map(|(before, after)| before.filter_records().len() - after.filter_records().len())
        .sum();
    tracing::info!(
        rule_count = processed.len(),
        inactive_filters_removed = removed,
        "Validated and processed DRE rules"
    );

    Ok(processed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
