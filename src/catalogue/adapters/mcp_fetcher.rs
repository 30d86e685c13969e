//! Tool fetcher that asks downstream services over MCP.

use crate::catalogue::{
    domain::{ServiceUrl, ToolDescriptor},
    ports::{ToolFetchError, ToolFetchResult, ToolFetcher},
};
use crate::mcp::{McpClientError, McpHttpClient};
use async_trait::async_trait;
use tracing::debug;

/// Fetches tool lists through a short-lived MCP session per call.
#[derive(Debug, Clone)]
pub struct McpToolFetcher {
    client: McpHttpClient,
}

impl McpToolFetcher {
    /// Creates a fetcher using `client` for downstream sessions.
    #[must_use]
    pub const fn new(client: McpHttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolFetcher for McpToolFetcher {
    async fn fetch_tools(&self, service_url: &ServiceUrl) -> ToolFetchResult<Vec<ToolDescriptor>> {
        let mut session = self
            .client
            .connect(service_url.mcp_endpoint())
            .await
            .map_err(|err| fetch_error(service_url, &err))?;
        let listed = session.list_tools().await;
        session.close().await;

        let definitions = listed.map_err(|err| fetch_error(service_url, &err))?;
        debug!(url = %service_url, count = definitions.len(), "fetched downstream tools");

        definitions
            .into_iter()
            .map(|definition| {
                ToolDescriptor::new(
                    definition.name,
                    definition.description.unwrap_or_default(),
                    definition.input_schema,
                )
                .map_err(|err| ToolFetchError::Protocol {
                    url: service_url.to_string(),
                    reason: err.to_string(),
                })
            })
            .collect()
    }
}

fn fetch_error(service_url: &ServiceUrl, err: &McpClientError) -> ToolFetchError {
    if err.is_unreachable() {
        ToolFetchError::Unreachable {
            url: service_url.to_string(),
            reason: err.to_string(),
        }
    } else {
        ToolFetchError::Protocol {
            url: service_url.to_string(),
            reason: err.to_string(),
        }
    }
}
