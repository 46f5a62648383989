pub mod deployment;
pub mod llm;
pub mod migration;
pub mod translation;
