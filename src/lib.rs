//! Salesforce MCP Library
//!
//! Model Context Protocol server exposing Salesforce schema, SOQL and
//! debug-log tooling to AI agents.

pub mod auth;
pub mod config;
pub mod mcp;
pub mod salesforce;
pub mod tools;

#[cfg(test)]
mod testing;

pub use auth::{AuthError, SalesforceAuth};
pub use config::{Config, RuntimeConfig};
pub use salesforce::{ConnectionProvider, SalesforceClient, SalesforceError};
pub use tools::{ToolDispatcher, ToolError};
