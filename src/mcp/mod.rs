//! MCP Server implementation for Salesforce
//!
//! Exposes the Salesforce tools, `salesforce://` resources and prompts

pub mod prompts;
pub mod protocol;
pub mod resources;
mod server;

pub use protocol::*;
pub use server::{SalesforceMcpServer, SERVER_NAME};
