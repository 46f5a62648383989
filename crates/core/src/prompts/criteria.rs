//! Filter group (condition side) translation prompts.

use serde::Serialize;
use serde_json::Value;

use crate::chat::ChatMessage;
use crate::error::CoreError;
use crate::model::{active_members, Filter, Rule};

use super::to_pretty_json;

const SYSTEM_PROMPT: &str = "You are a Salesforce Flow expert specializing in decision criteria. \
Analyze these DRE Filter Groups and translate them into clear, human-readable conditions. For each group:\n\
1. Identify the object being queried\n\
2. Specify any parent-child relationships in the object path\n\
3. List all filter conditions and their operators\n\
4. Explain how the conditions should be combined (AND/OR)\n\
5. Describe the business logic these filters implement\n\
Format the response as structured JSON with 'objectInfo', 'conditions', 'logicOperator', and 'businessLogic' properties. \
Return a JSON array of the translated filter groups.";

/// A filter group as presented to the model, with its active filters inlined.
#[derive(Debug, Serialize)]
pub struct FilterGroupPayload<'a> {
    #[serde(rename = "Id")]
    pub id: Option<&'a Value>,
    #[serde(rename = "Name")]
    pub name: Option<&'a Value>,
    #[serde(rename = "DRE__Condition__c")]
    pub condition: Option<&'a Value>,
    #[serde(rename = "DRE__Object_Name__c")]
    pub object_name: Option<&'a Value>,
    #[serde(rename = "DRE__Object_Path__c")]
    pub object_path: Option<&'a Value>,
    pub filters: Vec<&'a Filter>,
}

/// Collect the rule's filter groups, each with the active filters that
/// reference it.
pub fn filter_groups(rule: &Rule) -> Vec<FilterGroupPayload<'_>> {
    rule.filter_group_records()
        .iter()
        .map(|group| FilterGroupPayload {
            id: group.id.as_ref(),
            name: group.name.as_ref(),
            condition: group.condition.as_ref(),
            object_name: group.object_name.as_ref(),
            object_path: group.object_path.as_ref(),
            filters: active_members(
                rule.filter_records(),
                group.id.as_ref().and_then(Value::as_str),
            ),
        })
        .collect()
}

/// Build the criteria translation prompts for `rule`.
pub fn generate_prompts(rule: &Rule) -> Result<Vec<ChatMessage>, CoreError> {
    let groups = filter_groups(rule);

    tracing::debug!(
        rule_name = rule.display_name(),
        group_count = groups.len(),
        total_filters = groups.iter().map(|g| g.filters.len()).sum::<usize>(),
        "Filter groups extracted"
    );

    Ok(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(to_pretty_json(&groups)?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;
    use crate::prompts::fixtures::lead_rule;

    #[test]
    fn produces_system_then_user_message() {
        let prompts = generate_prompts(&lead_rule()).unwrap();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].role, Role::System);
        assert!(prompts[0].content.contains("'logicOperator'"));
        assert_eq!(prompts[1].role, Role::User);
    }

    #[test]
    fn groups_carry_only_their_active_filters() {
        let prompts = generate_prompts(&lead_rule()).unwrap();
        let groups: serde_json::Value = serde_json::from_str(&prompts[1].content).unwrap();

        assert_eq!(groups.as_array().unwrap().len(), 2);
        assert_eq!(groups[0]["Id"], "fg1");
        assert_eq!(groups[0]["filters"].as_array().unwrap().len(), 1);
        assert_eq!(groups[0]["filters"][0]["DRE__Field__c"], "Rating");
        assert_eq!(groups[1]["DRE__Object_Path__c"], "Lead.Owner");
        assert_eq!(groups[1]["filters"][0]["DRE__Value__c"], true);
    }

    #[test]
    fn inactive_filters_never_reach_the_prompt() {
        let prompts = generate_prompts(&lead_rule()).unwrap();
        assert!(prompts.iter().all(|m| !m.content.contains("INACTIVE_Status")));
    }

    #[test]
    fn null_filter_value_reaches_the_prompt() {
        let rule: Rule = serde_json::from_value(serde_json::json!({
            "DRE__Type__c": "Automation",
            "DRE__DRE_Filter_Groups__r": { "records": [{ "Id": "g1" }] },
            "DRE__DRE_Filters__r": { "records": [
                { "DRE__DRE_Group__c": "g1", "DRE__IsActive__c": true, "DRE__Field__c": "Email",
                  "DRE__Operator__c": "equals", "DRE__Value__c": null }
            ]}
        }))
        .unwrap();
        let prompts = generate_prompts(&rule).unwrap();
        let groups: serde_json::Value = serde_json::from_str(&prompts[1].content).unwrap();

        let filter = groups[0]["filters"][0].as_object().unwrap();
        assert_eq!(filter.get("DRE__Value__c"), Some(&serde_json::Value::Null));
    }

    #[test]
    fn rule_without_groups_yields_empty_array() {
        let rule: Rule =
            serde_json::from_value(serde_json::json!({ "DRE__Type__c": "Automation" })).unwrap();
        let prompts = generate_prompts(&rule).unwrap();
        assert_eq!(prompts[1].content, "[]");
    }
}
