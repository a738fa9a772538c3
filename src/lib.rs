//! Rolegate - RBAC administration through natural language commands

pub mod command;
pub mod core;
pub mod llm;
pub mod server;
pub mod store;
