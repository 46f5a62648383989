//! DRE rule export records.
//!
//! Mirrors the shape of a `DRE__Rule__c` record exported from Salesforce with
//! its four related lists embedded as sub-query envelopes. The fields the
//! pipeline reasons about are named, but their values stay raw JSON: an
//! explicit `null` or an unexpected type is carried as-is instead of being
//! dropped or rejected. Every other key is kept in `extra`, so records pass
//! through validation and prompting unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// The only rule type the migration pipeline supports.
pub const SUPPORTED_RULE_TYPE: &str = "Automation";

/// Placeholder used in logs and responses for rules without a `Name`.
pub const UNNAMED_RULE: &str = "<unnamed>";

/// Deserialize a present key as `Some`, including an explicit `null`.
///
/// Paired with `default`, an absent key stays `None` and is skipped on output,
/// while `null` serializes back as `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Only the JSON literal `true` counts as an active flag.
fn is_true(flag: Option<&Value>) -> bool {
    matches!(flag, Some(Value::Bool(true)))
}

// ---------------------------------------------------------------------------
// Related list envelope
// ---------------------------------------------------------------------------

/// A Salesforce sub-query result: `{ "totalSize": 2, "done": true, "records": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedRecords<T> {
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<T> RelatedRecords<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            extra: Map::new(),
        }
    }
}

/// Records that reference their owning group by id and carry an active flag.
pub trait GroupMember {
    fn group_id(&self) -> Option<&str>;
    fn is_active(&self) -> bool;
}

/// Return the active members of `records` that belong to the group `group_id`,
/// preserving their original order.
///
/// A group without an id owns nothing.
pub fn active_members<'a, T: GroupMember>(
    records: &'a [T],
    group_id: Option<&str>,
) -> Vec<&'a T> {
    let Some(group_id) = group_id else {
        return Vec::new();
    };
    records
        .iter()
        .filter(|r| r.is_active() && r.group_id() == Some(group_id))
        .collect()
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// One DRE rule with its condition and action sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(
        rename = "Name",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<Value>,
    #[serde(
        rename = "DRE__Description__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Value>,
    #[serde(
        rename = "DRE__Type__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub rule_type: Option<Value>,
    #[serde(
        rename = "DRE__IsActive__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_active: Option<Value>,
    #[serde(
        rename = "DRE__Object_Name__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub object_name: Option<Value>,
    #[serde(
        rename = "DRE__Trigger_Event__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub trigger_event: Option<Value>,
    #[serde(
        rename = "DRE__DRE_Filter_Groups__r",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub filter_groups: Option<Option<RelatedRecords<FilterGroup>>>,
    #[serde(
        rename = "DRE__DRE_Filters__r",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub filters: Option<Option<RelatedRecords<Filter>>>,
    #[serde(
        rename = "DRE__DRE_Result_Groups__r",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub result_groups: Option<Option<RelatedRecords<ResultGroup>>>,
    #[serde(
        rename = "DRE__DRE_Results__r",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub results: Option<Option<RelatedRecords<RuleResult>>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Rule {
    /// Rule name for logging, falling back to [`UNNAMED_RULE`].
    pub fn display_name(&self) -> &str {
        self.name
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or(UNNAMED_RULE)
    }

    pub fn filter_group_records(&self) -> &[FilterGroup] {
        self.filter_groups
            .as_ref()
            .and_then(Option::as_ref)
            .map(|g| g.records.as_slice())
            .unwrap_or_default()
    }

    pub fn filter_records(&self) -> &[Filter] {
        self.filters
            .as_ref()
            .and_then(Option::as_ref)
            .map(|f| f.records.as_slice())
            .unwrap_or_default()
    }

    pub fn result_group_records(&self) -> &[ResultGroup] {
        self.result_groups
            .as_ref()
            .and_then(Option::as_ref)
            .map(|g| g.records.as_slice())
            .unwrap_or_default()
    }

    pub fn result_records(&self) -> &[RuleResult] {
        self.results
            .as_ref()
            .and_then(Option::as_ref)
            .map(|r| r.records.as_slice())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Condition side
// ---------------------------------------------------------------------------

/// A group of filter clauses combined with one logic operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    #[serde(
        rename = "Id",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Value>,
    #[serde(
        rename = "Name",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<Value>,
    /// AND / OR semantics for the group's filters.
    #[serde(
        rename = "DRE__Condition__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub condition: Option<Value>,
    #[serde(
        rename = "DRE__Object_Name__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub object_name: Option<Value>,
    /// Relationship path from the rule object to the queried object.
    #[serde(
        rename = "DRE__Object_Path__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub object_path: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single condition clause. Belongs to a [`FilterGroup`] by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(
        rename = "Id",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Value>,
    #[serde(
        rename = "DRE__DRE_Group__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub group_id: Option<Value>,
    #[serde(
        rename = "DRE__IsActive__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_active: Option<Value>,
    #[serde(
        rename = "DRE__Field__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub field: Option<Value>,
    #[serde(
        rename = "DRE__Operator__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub operator: Option<Value>,
    #[serde(
        rename = "DRE__Value__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GroupMember for Filter {
    fn group_id(&self) -> Option<&str> {
        self.group_id.as_ref().and_then(Value::as_str)
    }

    /// Only an explicit `true` counts as active.
    fn is_active(&self) -> bool {
        is_true(self.is_active.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Action side
// ---------------------------------------------------------------------------

/// A group of record mutations executed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultGroup {
    #[serde(
        rename = "Id",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Value>,
    #[serde(
        rename = "Name",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<Value>,
    #[serde(
        rename = "DRE__Description__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single create/update action. Belongs to a [`ResultGroup`] by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    #[serde(
        rename = "Id",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Value>,
    #[serde(
        rename = "DRE__DRE_Group__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub group_id: Option<Value>,
    #[serde(
        rename = "DRE__IsActive__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_active: Option<Value>,
    #[serde(
        rename = "DRE__Action__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub action: Option<Value>,
    #[serde(
        rename = "DRE__Field__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub field: Option<Value>,
    #[serde(
        rename = "DRE__Value__c",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GroupMember for RuleResult {
    fn group_id(&self) -> Option<&str> {
        self.group_id.as_ref().and_then(Value::as_str)
    }

    fn is_active(&self) -> bool {
        is_true(self.is_active.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Translation output
// ---------------------------------------------------------------------------

/// LLM-authored description of one rule, consumed by flow generation.
///
/// Each part is whatever JSON the model produced for the rule summary, the
/// filter groups and the result groups respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedRule {
    pub rule: Value,
    pub criteria: Value,
    pub results: Value,
}

// ---------------------------------------------------------------------------
// Rule set parsing
// ---------------------------------------------------------------------------

/// Parse an uploaded rule set.
///
/// Accepts a JSON array of rules, a single rule object, or a Salesforce
/// query envelope (`{ "records": [...] }`). A JSON string is decoded first,
/// which is how the upload form submits the file contents.
pub fn parse_rule_set(input: &Value) -> Result<Vec<Rule>, CoreError> {
    if let Value::String(raw) = input {
        let decoded: Value = serde_json::from_str(raw)
            .map_err(|e| CoreError::Validation(format!("jsonString is not valid JSON: {e}")))?;
        return parse_rule_set(&decoded);
    }

    let items: Vec<&Value> = match input {
        Value::Array(items) => items.iter().collect(),
        Value::Object(obj) => match obj.get("records") {
            Some(Value::Array(records)) => records.iter().collect(),
            _ => vec![input],
        },
        _ => {
            return Err(CoreError::Validation(
                "Rule set must be a JSON array or object".to_string(),
            ))
        }
    };

    if items.is_empty() {
        return Err(CoreError::Validation(
            "Rule set must contain at least one rule".to_string(),
        ));
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(CoreError::Validation(format!(
                    "Rule at index {index} must be a JSON object"
                )));
            }
            Rule::deserialize(item).map_err(|e| {
                CoreError::Validation(format!("Rule at index {index} is malformed: {e}"))
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
