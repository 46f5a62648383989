//! Salesforce Metadata API deployment.
//!
//! Packages a flow into a deploy zip, logs in through the SOAP partner API
//! and runs a metadata `deploy`, polling `checkDeployStatus` until it settles.

pub mod client;
pub mod error;
pub mod package;
pub mod result;
pub mod soap;

pub use client::{DeployTarget, SalesforceClient, SalesforceConfig};
pub use error::SalesforceError;
pub use package::build_flow_package;
pub use result::{ComponentFailure, DeployResult};
