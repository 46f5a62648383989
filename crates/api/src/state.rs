use std::sync::Arc;

use dre2flow_llm::CompletionClient;
use dre2flow_pipeline::{FlowDeployer, FlowGenerator, MigrationPipeline, RuleTranslator};
use dre2flow_salesforce::DeployTarget;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Completion endpoint client, used directly by the connectivity check.
    pub llm: Arc<dyn CompletionClient>,
    pub translator: Arc<RuleTranslator>,
    pub migration: Arc<MigrationPipeline>,
    pub deployer: Arc<FlowDeployer>,
}

impl AppState {
    /// Wire the pipeline stages around the given external clients.
    pub fn new(
        config: Arc<ServerConfig>,
        llm: Arc<dyn CompletionClient>,
        deploy_target: Arc<dyn DeployTarget>,
    ) -> Self {
        let translator = Arc::new(RuleTranslator::new(Arc::clone(&llm)));
        let generator = Arc::new(FlowGenerator::new(
            Arc::clone(&llm),
            config.generator.clone(),
        ));
        let migration = Arc::new(MigrationPipeline::new(Arc::clone(&translator), generator));
        let deployer = Arc::new(FlowDeployer::new(deploy_target));

        Self {
            config,
            llm,
            translator,
            migration,
            deployer,
        }
    }
}
