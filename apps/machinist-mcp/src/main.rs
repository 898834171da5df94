//! # Machinist MCP Server
//!
//! Entry point for the MCP (Model Context Protocol) bridge to Machinist.
//!
//! Reads configuration from environment variables:
//! - `MACHINIST_URL`: Machinist server URL (default: `http://localhost:8080`)
//! - `MACHINIST_API_KEY`: optional Bearer token for authentication
//!
//! Talks to AI clients via MCP over stdio and forwards each tool call to the
//! Machinist HTTP API.

mod client;
mod server;

use client::MachinistClient;
use rmcp::{ServiceExt, transport::stdio};
use server::MachinistMcp;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout is the MCP transport; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let url = std::env::var("MACHINIST_URL").unwrap_or_else(|_| "http://localhost:8080".into());
    let api_key = std::env::var("MACHINIST_API_KEY")
        .ok()
        .filter(|key| !key.is_empty());

    tracing::info!("Machinist MCP server starting, target: {}", url);

    let client = MachinistClient::new(url, api_key);
    let mcp = MachinistMcp::new(client);

    let service = mcp.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("MCP serve error: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}
