//! Result group (action side) translation prompts.

use serde::Serialize;
use serde_json::Value;

use crate::chat::ChatMessage;
use crate::error::CoreError;
use crate::model::{active_members, Rule, RuleResult};

use super::to_pretty_json;

const SYSTEM_PROMPT: &str = "You are a Salesforce data operations expert. \
Analyze these DRE Result Groups and translate them into clear, human-readable descriptions of record updates and creations. For each group:\n\
1. Identify the objects being modified\n\
2. Specify the parent objects and path to the lookup relationship if this is updating related object\n\
3. Specify if it's a creation or update operation\n\
4. List the specific fields being modified\n\
5. Explain the business logic behind each operation\n\
Format the response as structured JSON with 'operationType', 'objects', 'fields', and 'businessLogic' properties. \
Return a JSON array of the translated groups. \
Order the groups in the same sequence as Result Group order.";

/// A result group as presented to the model, with its active results inlined.
#[derive(Debug, Serialize)]
pub struct ResultGroupPayload<'a> {
    #[serde(rename = "Id")]
    pub id: Option<&'a Value>,
    #[serde(rename = "Name")]
    pub name: Option<&'a Value>,
    #[serde(rename = "DRE__Description__c")]
    pub description: Option<&'a Value>,
    pub results: Vec<&'a RuleResult>,
}

/// Collect the rule's result groups in export order, each with the active
/// results that reference it.
pub fn result_groups(rule: &Rule) -> Vec<ResultGroupPayload<'_>> {
    rule.result_group_records()
        .iter()
        .map(|group| ResultGroupPayload {
            id: group.id.as_ref(),
            name: group.name.as_ref(),
            description: group.description.as_ref(),
            results: active_members(
                rule.result_records(),
                group.id.as_ref().and_then(Value::as_str),
            ),
        })
        .collect()
}

/// Build the result translation prompts for `rule`.
pub fn generate_prompts(rule: &Rule) -> Result<Vec<ChatMessage>, CoreError> {
    let groups = result_groups(rule);

    tracing::debug!(
        rule_name = rule.display_name(),
        group_count = groups.len(),
        total_results = groups.iter().map(|g| g.results.len()).sum::<usize>(),
        "Result groups extracted"
    );

    Ok(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(to_pretty_json(&groups)?),
    ])
}
