//! Salesforce tools
//!
//! Catalog, parameter parsing, handlers and the dispatcher that ties them
//! to the shared connection.

pub mod catalog;
mod debug_logs;
pub mod dispatcher;
pub mod error;
pub mod output;
pub mod params;
mod records;
mod schema;
mod validation_rules;

pub use catalog::{find_tool, ToolDescriptor, TOOLS};
pub use dispatcher::ToolDispatcher;
pub use error::ToolError;
pub use output::{ToolOutput, ToolResult};
pub use params::ToolCall;
