//! Forwards tool calls over short-lived downstream MCP sessions.

use super::ports::{ForwardError, ForwardResult, ToolForwarder};
use crate::catalogue::domain::RegisteredTool;
use crate::mcp::McpHttpClient;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::time;
use tracing::debug;

/// Opens a fresh session per call so no session identity is shared between
/// callers.
#[derive(Debug, Clone)]
pub struct McpToolForwarder {
    client: McpHttpClient,
    timeout: Duration,
}

impl McpToolForwarder {
    /// Creates a forwarder bounding the handshake and the call by `timeout`
    /// each.
    #[must_use]
    pub const fn new(client: McpHttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    const fn timed_out(&self) -> ForwardError {
        ForwardError::TimedOut {
            timeout: self.timeout,
        }
    }
}

#[async_trait]
impl ToolForwarder for McpToolForwarder {
    async fn forward(&self, tool: &RegisteredTool, arguments: Value) -> ForwardResult<Value> {
        let endpoint = tool.service_url().mcp_endpoint();
        let mut session = time::timeout(self.timeout, self.client.connect(endpoint))
            .await
            .map_err(|_| self.timed_out())??;

        let outcome = time::timeout(
            self.timeout,
            session.call_tool(tool.original_tool_name(), Some(arguments)),
        )
        .await;
        session.close().await;

        let reply = outcome.map_err(|_| self.timed_out())??;
        debug!(tool = %tool.name(), service = %tool.service_name(), "tool call forwarded");
        Ok(reply)
    }
}
