//! MCP Server implementation for Salesforce
//!
//! Exposes the Salesforce tools, schema/picklist resources and guidance
//! prompts over JSON-RPC.

use crate::mcp::prompts;
use crate::mcp::protocol::*;
use crate::mcp::resources;
use crate::salesforce::SalesforceError;
use crate::tools::{ToolDispatcher, ToolError, TOOLS};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

pub const SERVER_NAME: &str = "salesforce-mcp";

const INSTRUCTIONS: &str = "Tools for exploring a Salesforce org: search objects, describe \
schemas and relationships, query records with SOQL, read picklist values and validation \
rules, and manage Apex debug logs. Use search_objects first when the exact API name of an \
object is unknown.";

/// MCP Server for Salesforce
pub struct SalesforceMcpServer {
    dispatcher: ToolDispatcher,
}

impl SalesforceMcpServer {
    /// Create a new MCP server instance
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Get list of available tools
    pub fn get_tools(&self) -> Vec<Tool> {
        TOOLS
            .iter()
            .map(|t| Tool {
                name: t.name.to_string(),
                description: t.description.to_string(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Run a tool; every failure becomes an `isError` result
    pub async fn call_tool(&self, name: &str, args: &HashMap<String, Value>) -> CallToolResult {
        tracing::info!("Calling tool {}", name);
        match self.dispatcher.dispatch(name, args).await {
            Ok(output) => CallToolResult::structured(output.text, output.structured),
            Err(e) => CallToolResult::error(e.to_string()),
        }
    }

    /// Read a `salesforce://` resource by running the tool behind it
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, JsonRpcError> {
        let (tool, args) = resources::route(uri).ok_or_else(|| JsonRpcError {
            code: RESOURCE_NOT_FOUND,
            message: format!("Resource not found: {}", uri),
            data: Some(json!({ "uri": uri })),
        })?;

        let output = self.dispatcher.dispatch(tool, &args).await.map_err(|e| {
            let code = match e {
                ToolError::InvalidParameter(_) => INVALID_PARAMS,
                ToolError::Unresolved(_) | ToolError::Upstream(SalesforceError::NotFound(_)) => {
                    RESOURCE_NOT_FOUND
                }
                _ => INTERNAL_ERROR,
            };
            JsonRpcError {
                code,
                message: e.to_string(),
                data: Some(json!({ "uri": uri })),
            }
        })?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents {
                uri: uri.to_string(),
                mime_type: Some(resources::MIME_TYPE.to_string()),
                text: output.text,
            }],
        })
    }

    /// Handle one JSON-RPC message; notifications yield `None`
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!("Notification: {}", request.method);
            return None;
        }

        let id = request.id.clone();
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                format!("Unsupported jsonrpc version: {}", request.jsonrpc),
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => {
                let params: InitializeParams = request
                    .params
                    .and_then(|p| serde_json::from_value(p).ok())
                    .unwrap_or_default();
                if let Some(ref client) = params.client_info {
                    tracing::info!("Client connected: {} {}", client.name, client.version);
                }
                let result = InitializeResult {
                    protocol_version: negotiate_protocol_version(
                        params.protocol_version.as_deref(),
                    )
                    .to_string(),
                    capabilities: ServerCapabilities {
                        tools: Some(ListChangedCapability {
                            list_changed: Some(false),
                        }),
                        resources: Some(ResourcesCapability {
                            subscribe: Some(false),
                            list_changed: Some(false),
                        }),
                        prompts: Some(ListChangedCapability {
                            list_changed: Some(false),
                        }),
                    },
                    server_info: ServerInfo {
                        name: SERVER_NAME.to_string(),
                        version: env!("CARGO_PKG_VERSION").to_string(),
                    },
                    instructions: Some(INSTRUCTIONS.to_string()),
                };
                respond(id, &result)
            }

            "ping" => JsonRpcResponse::success(id, json!({})),

            "tools/list" => respond(
                id,
                &ListToolsResult {
                    tools: self.get_tools(),
                },
            ),

            "tools/call" => match parse_params::<CallToolParams>(request.params) {
                Ok(params) => {
                    let args = params.arguments.unwrap_or_default();
                    let result = self.call_tool(&params.name, &args).await;
                    respond(id, &result)
                }
                Err(message) => JsonRpcResponse::error(id, INVALID_PARAMS, message),
            },

            "resources/list" => respond(id, &ListResourcesResult { resources: vec![] }),

            "resources/templates/list" => respond(
                id,
                &ListResourceTemplatesResult {
                    resource_templates: resources::resource_templates(),
                },
            ),

            "resources/read" => match parse_params::<ReadResourceParams>(request.params) {
                Ok(params) => match self.read_resource(&params.uri).await {
                    Ok(result) => respond(id, &result),
                    Err(error) => JsonRpcResponse {
                        jsonrpc: "2.0".to_string(),
                        id,
                        result: None,
                        error: Some(error),
                    },
                },
                Err(message) => JsonRpcResponse::error(id, INVALID_PARAMS, message),
            },

            "prompts/list" => respond(
                id,
                &ListPromptsResult {
                    prompts: prompts::list_prompts(),
                },
            ),

            "prompts/get" => match parse_params::<GetPromptParams>(request.params) {
                Ok(params) => match prompts::get_prompt(&params.name) {
                    Some(prompt) => respond(id, &prompt),
                    None => JsonRpcResponse::error(
                        id,
                        INVALID_PARAMS,
                        format!("Unknown prompt: {}", params.name),
                    ),
                },
                Err(message) => JsonRpcResponse::error(id, INVALID_PARAMS, message),
            },

            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        Some(response)
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Option<Value>) -> Result<T, String> {
    let params = params.ok_or_else(|| "Missing params".to_string())?;
    serde_json::from_value(params).map_err(|e| format!("Invalid params: {}", e))
}

fn respond<T: Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Serialization error: {}", e)),
    }
}
