//! Salesforce MCP Server
//!
//! Entry point for the MCP server binary.
//! Implements MCP protocol over stdio using JSON-RPC 2.0, one message per line.

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use salesforce_mcp::config::Config;
use salesforce_mcp::mcp::{JsonRpcRequest, JsonRpcResponse, SalesforceMcpServer, PARSE_ERROR};
use salesforce_mcp::salesforce::ConnectionProvider;
use salesforce_mcp::tools::ToolDispatcher;
use std::io;
use std::sync::Arc;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting Salesforce MCP Server...");

    let runtime_config = Config::load_default()?.to_runtime()?;
    tracing::info!(
        "Configured for {} ({} flow, API {})",
        runtime_config
            .domain_url
            .as_deref()
            .unwrap_or("<no domain_url>"),
        runtime_config.auth_flow(),
        runtime_config.api_version
    );

    // Login is deferred to the first tool call
    let provider = Arc::new(ConnectionProvider::from_config(Arc::new(runtime_config)));
    let server = SalesforceMcpServer::new(ToolDispatcher::new(provider));

    tracing::info!("MCP Server ready, listening on stdio...");

    run_stdio_loop(server).await
}

async fn run_stdio_loop(server: SalesforceMcpServer) -> Result<()> {
    let mut reader = FramedRead::new(tokio::io::stdin(), LinesCodec::new());
    let mut writer = FramedWrite::new(tokio::io::stdout(), LinesCodec::new());

    while let Some(line) = reader.next().await {
        let line = line.context("Failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        tracing::debug!("Received: {}", line);

        let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
            Ok(request) => server.handle_request(request).await,
            Err(e) => Some(JsonRpcResponse::error(
                None,
                PARSE_ERROR,
                format!("Parse error: {}", e),
            )),
        };

        if let Some(response) = response {
            let json = serde_json::to_string(&response)?;
            tracing::debug!("Sending: {}", json);
            writer.send(json).await.context("Failed to write to stdout")?;
        }
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
