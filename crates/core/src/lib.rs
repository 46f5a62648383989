//! Domain logic for migrating DRE rules to Salesforce Flows.
//!
//! Everything in this crate is pure: rule parsing and validation, prompt
//! construction, completion reply decoding, and the flow artifact contract.
//! Network and filesystem access live in the client and pipeline crates.

pub mod chat;
pub mod error;
pub mod flow;
pub mod model;
pub mod prompts;
pub mod reply;
pub mod types;
pub mod validation;
