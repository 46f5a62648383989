//! Rule-level summary prompts.

use serde::Serialize;
use serde_json::Value;

use crate::chat::ChatMessage;
use crate::error::CoreError;
use crate::model::{FilterGroup, ResultGroup, Rule};

use super::to_pretty_json;

const SYSTEM_PROMPT: &str = r#"You are a DRE Rule expert specializing in extracting DRE Rule criteria from a JSON object. Summarize the JSON object into a DRE Rule criteria object following these requirements:
1. Required Fields:
- Rule Name
- Rule Description
- Rule Type
- Rule Active Status
- Rule Object
- Rule Trigger Event
2. Optional Fields:
- Rule Filter Criteria
- Rule Action Criteria
3. Business Logic:
- Extract the rule name from the JSON object
- Extract the rule description from the JSON object
4. Output:
- As JSON Object with the following structure:
{
    "Rule Name": ruleName,
    "Rule Description": ruleDescription,
    "Rule Type": ruleType,
    "Rule Active Status": ruleActiveStatus,
    "Rule Object": ruleObject,
    "Rule Trigger Event": ruleTriggerEvent,
    "Rule Filter Criteria": ruleFilterCriteria,
    "Rule Action Criteria": ruleActionCriteria,
    "Business Logic": businessLogic
}"#;

/// Core rule information presented to the model.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuleInfo<'a> {
    pub name: Option<&'a Value>,
    pub description: Option<&'a Value>,
    #[serde(rename = "Type")]
    pub rule_type: Option<&'a Value>,
    pub is_active: Option<&'a Value>,
    pub object: Option<&'a Value>,
    pub trigger_event: Option<&'a Value>,
    pub filter_criteria: &'a [FilterGroup],
    pub action_criteria: &'a [ResultGroup],
}

impl<'a> RuleInfo<'a> {
    pub fn from_rule(rule: &'a Rule) -> Self {
        Self {
            name: rule.name.as_ref(),
            description: rule.description.as_ref(),
            rule_type: rule.rule_type.as_ref(),
            is_active: rule.is_active.as_ref(),
            object: rule.object_name.as_ref(),
            trigger_event: rule.trigger_event.as_ref(),
            filter_criteria: rule.filter_group_records(),
            action_criteria: rule.result_group_records(),
        }
    }
}

/// Build the rule summary prompts for `rule`.
pub fn generate_prompts(rule: &Rule) -> Result<Vec<ChatMessage>, CoreError> {
    let info = RuleInfo::from_rule(rule);
    tracing::debug!(rule_name = rule.display_name(), "Rule information extracted");

    Ok(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(to_pretty_json(&info)?),
    ])
}
