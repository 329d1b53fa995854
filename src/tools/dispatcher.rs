//! Tool dispatch
//!
//! Arguments are parsed into a `ToolCall` first; only a well-formed call
//! asks the provider for a connection.

use crate::salesforce::{ConnectionProvider, SalesforceApi};
use crate::tools::output::ToolResult;
use crate::tools::params::ToolCall;
use crate::tools::{debug_logs, records, schema, validation_rules};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Routes tool calls to their handlers over the shared connection
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    provider: Arc<ConnectionProvider>,
}

impl ToolDispatcher {
    pub fn new(provider: Arc<ConnectionProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<ConnectionProvider> {
        &self.provider
    }

    /// Parse and run a tool call by name
    pub async fn dispatch(&self, name: &str, args: &HashMap<String, Value>) -> ToolResult {
        let call = ToolCall::parse(name, args)
            .inspect_err(|e| tracing::warn!("Rejected call to {}: {}", name, e))?;
        self.execute(call).await
    }

    /// Run an already validated call
    pub async fn execute(&self, call: ToolCall) -> ToolResult {
        let connection = self.provider.get_connection().await?;
        let result = run(connection.as_ref(), &call).await;

        match result {
            Ok(ref output) => {
                tracing::debug!("{} returned {} bytes of text", call.name(), output.text.len());
            }
            Err(ref e) if e.is_session_expired() => {
                tracing::warn!("Salesforce session expired during {}: {}", call.name(), e);
                self.provider.invalidate().await;
            }
            Err(ref e) => {
                tracing::error!("{} failed: {}", call.name(), e);
            }
        }

        result
    }
}

async fn run(api: &dyn SalesforceApi, call: &ToolCall) -> ToolResult {
    match call {
        ToolCall::SearchObjects(p) => schema::search_objects(api, p).await,
        ToolCall::DescribeObject(p) => schema::describe_object(api, p).await,
        ToolCall::DescribeObjectWithApi(p) => schema::describe_object_with_api(api, p).await,
        ToolCall::DescribeRelationshipFields(p) => schema::describe_relationship_fields(api, p).await,
        ToolCall::QueryRecords(p) => records::query_records(api, p).await,
        ToolCall::GetFieldsByType(p) => schema::get_fields_by_type(api, p).await,
        ToolCall::GetPicklistValues(p) => schema::get_picklist_values(api, p).await,
        ToolCall::GetValidationRules(p) => validation_rules::get_validation_rules(api, p).await,
        ToolCall::ManageDebugLogs(p) => debug_logs::manage_debug_logs(api, p).await,
    }
}
