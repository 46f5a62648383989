//! Translation, flow generation and deployment stages.
//!
//! Each stage holds its collaborators behind `Arc<dyn ...>` so the API layer
//! can share one instance across requests and tests can substitute fakes.

pub mod deployment;
pub mod error;
pub mod generation;
pub mod migration;
pub mod translation;

#[cfg(test)]
pub(crate) mod testing;

pub use deployment::{DeploymentOutcome, FlowDeployer};
pub use error::PipelineError;
pub use generation::{FlowGenerator, GeneratorConfig, SavedFlow};
pub use migration::MigrationPipeline;
pub use translation::{RuleTranslation, RuleTranslator};
