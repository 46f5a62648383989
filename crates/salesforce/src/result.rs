use serde::Serialize;

/// Outcome of a metadata deployment as reported by `checkDeployStatus`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResult {
    pub id: String,
    pub done: bool,
    pub success: bool,
    pub status: String,
    pub number_components_deployed: u32,
    pub number_components_total: u32,
    pub number_component_errors: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub component_failures: Vec<ComponentFailure>,
}

/// One component that failed to deploy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentFailure {
    pub problem: String,
    pub file_name: String,
    pub full_name: String,
    pub problem_type: String,
}

impl DeployResult {
    /// Component failure problems joined with `", "`.
    pub fn problems(&self) -> String {
        self.component_failures
            .iter()
            .map(|f| f.problem.as_str())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
