//! Tool error types

use crate::auth::AuthError;
use crate::salesforce::SalesforceError;
use thiserror::Error;

/// Why a tool call produced no result
#[derive(Error, Debug)]
pub enum ToolError {
    /// Login failed or credentials are missing
    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthError),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Caller input rejected before any network call
    #[error("Invalid parameters: {0}")]
    InvalidParameter(String),

    /// Salesforce rejected or failed the request
    #[error("Salesforce API error: {0}")]
    Upstream(#[from] SalesforceError),

    /// The request was valid but the org has nothing usable for it
    #[error("{0}")]
    Unresolved(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ToolError::InvalidParameter(message.into())
    }

    pub fn unresolved(message: impl Into<String>) -> Self {
        ToolError::Unresolved(message.into())
    }

    /// True when the cached session should be thrown away
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ToolError::Upstream(SalesforceError::SessionExpired(_)))
    }
}
