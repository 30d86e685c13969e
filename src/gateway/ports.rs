//! Seams between the gateway front end and the catalogue it federates.

use crate::catalogue::{
    domain::{CatalogueEntry, RegisteredTool, ServiceRecord},
    ports::{CatalogueVersionStore, ServiceCatalogueRepository, ToolFetcher},
    services::{
        CatalogueCache, CatalogueCacheResult, CatalogueService, CatalogueServiceResult,
        CatalogueSnapshot, RegisterServiceRequest,
    },
};
use crate::mcp::McpClientError;
use async_trait::async_trait;
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for forwarded tool calls.
pub type ForwardResult<T> = Result<T, ForwardError>;

/// Source of the federated tool list.
#[async_trait]
pub trait ToolCatalogue: Send + Sync {
    /// Returns the current catalogue snapshot.
    async fn snapshot(&self) -> CatalogueCacheResult<Arc<CatalogueSnapshot>>;
}

/// Registry operations exposed over HTTP.
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// Registers a service and records its tools.
    async fn register(&self, request: RegisterServiceRequest)
    -> CatalogueServiceResult<ServiceRecord>;

    /// Refreshes the tools of an active service.
    async fn update(&self, name: &str) -> CatalogueServiceResult<ServiceRecord>;

    /// Soft-deletes an active service.
    async fn delete(&self, name: &str) -> CatalogueServiceResult<ServiceRecord>;

    /// Lists active services with their tools.
    async fn list(&self) -> CatalogueServiceResult<Vec<CatalogueEntry>>;
}

/// Delivers a validated tool call to the service that owns it.
#[async_trait]
pub trait ToolForwarder: Send + Sync {
    /// Calls `tool` downstream with `arguments` and returns the raw reply.
    async fn forward(&self, tool: &RegisteredTool, arguments: Value) -> ForwardResult<Value>;
}

/// Failures of a forwarded tool call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForwardError {
    /// The downstream exchange failed.
    #[error(transparent)]
    Downstream(#[from] McpClientError),

    /// The downstream did not finish within the call budget.
    #[error("no reply within {} ms", .timeout.as_millis())]
    TimedOut {
        /// Budget that was exceeded.
        timeout: Duration,
    },
}

#[async_trait]
impl<R, V> ToolCatalogue for CatalogueCache<R, V>
where
    R: ServiceCatalogueRepository,
    V: CatalogueVersionStore,
{
    async fn snapshot(&self) -> CatalogueCacheResult<Arc<CatalogueSnapshot>> {
        self.get_all_tools().await
    }
}

#[async_trait]
impl<R, V, F, C> ServiceRegistry for CatalogueService<R, V, F, C>
where
    R: ServiceCatalogueRepository,
    V: CatalogueVersionStore,
    F: ToolFetcher,
    C: Clock + Send + Sync,
{
    async fn register(
        &self,
        request: RegisterServiceRequest,
    ) -> CatalogueServiceResult<ServiceRecord> {
        Self::register(self, request).await
    }

    async fn update(&self, name: &str) -> CatalogueServiceResult<ServiceRecord> {
        Self::update(self, name).await
    }

    async fn delete(&self, name: &str) -> CatalogueServiceResult<ServiceRecord> {
        Self::delete(self, name).await
    }

    async fn list(&self) -> CatalogueServiceResult<Vec<CatalogueEntry>> {
        Self::list(self).await
    }
}
