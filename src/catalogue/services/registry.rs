//! Service layer for registering, refreshing, and removing services.

use crate::catalogue::{
    domain::{
        CatalogueDomainError, CatalogueEntry, ServiceName, ServiceRecord, ServiceUrl,
        ToolDescriptor, dedupe_tools,
    },
    ports::{
        CatalogueVersionError, CatalogueVersionStore, ServiceCatalogueError,
        ServiceCatalogueRepository, ToolFetchError, ToolFetcher,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Request payload for registering a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterServiceRequest {
    /// Unique service name.
    pub name: String,
    /// Service base url.
    pub url: String,
}

impl RegisterServiceRequest {
    /// Creates a registration request.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Service-level errors for catalogue mutations.
#[derive(Debug, Error)]
pub enum CatalogueServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] CatalogueDomainError),
    /// Repository operation failed, including uniqueness conflicts.
    #[error(transparent)]
    Repository(#[from] ServiceCatalogueError),
    /// The catalogue version could not be bumped.
    #[error(transparent)]
    Version(#[from] CatalogueVersionError),
    /// The downstream tool list could not be refreshed.
    #[error("failed to refresh tools of service '{name}': {source}")]
    Fetch {
        /// Service whose refresh failed.
        name: ServiceName,
        /// Underlying fetch failure.
        #[source]
        source: ToolFetchError,
    },
    /// No active service has the given name.
    #[error("service '{0}' not found")]
    NotFound(String),
}

impl CatalogueServiceError {
    /// Returns whether the error reports a name or url conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Repository(err) if err.is_conflict())
    }
}

/// Result type for catalogue service operations.
pub type CatalogueServiceResult<T> = Result<T, CatalogueServiceError>;

/// Orchestrates catalogue mutations and version bumps.
///
/// Every successful mutation bumps the shared catalogue version before it
/// returns, so caches observe the change on their next read.
#[derive(Clone)]
pub struct CatalogueService<R, V, F, C>
where
    R: ServiceCatalogueRepository,
    V: CatalogueVersionStore,
    F: ToolFetcher,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    versions: Arc<V>,
    fetcher: Arc<F>,
    clock: Arc<C>,
}

impl<R, V, F, C> CatalogueService<R, V, F, C>
where
    R: ServiceCatalogueRepository,
    V: CatalogueVersionStore,
    F: ToolFetcher,
    C: Clock + Send + Sync,
{
    /// Creates a new catalogue service.
    #[must_use]
    pub const fn new(repository: Arc<R>, versions: Arc<V>, fetcher: Arc<F>, clock: Arc<C>) -> Self {
        Self {
            repository,
            versions,
            fetcher,
            clock,
        }
    }

    /// Registers a new service and records its current tools.
    ///
    /// A failed tool fetch is logged and leaves the service registered with
    /// an empty tool list.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueServiceError::Domain`] for an invalid name or url,
    /// [`CatalogueServiceError::Repository`] when an active service already
    /// holds the name or url, and version store failures.
    pub async fn register(
        &self,
        request: RegisterServiceRequest,
    ) -> CatalogueServiceResult<ServiceRecord> {
        let service_name = ServiceName::new(request.name)?;
        let service_url = ServiceUrl::new(request.url)?;
        let service = ServiceRecord::new(service_name, service_url, &*self.clock);
        self.repository.insert(&service).await?;

        match self.fetcher.fetch_tools(service.url()).await {
            Ok(fetched) => {
                let tools = unique_tools(&service, fetched);
                self.repository
                    .replace_tools(service.id(), &tools, service.updated_at())
                    .await?;
                info!(
                    service = %service.name(),
                    url = %service.url(),
                    tools = tools.len(),
                    "registered service"
                );
            }
            Err(err) => {
                error!(
                    service = %service.name(),
                    url = %service.url(),
                    error = %err,
                    "registered service without tools; initial fetch failed"
                );
            }
        }

        self.bump_version().await?;
        Ok(service)
    }

    /// Re-fetches the tools of an active service and replaces its list.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueServiceError::NotFound`] when no active service
    /// has the name and [`CatalogueServiceError::Fetch`] when the downstream
    /// cannot be refreshed; the stored list is untouched in both cases.
    pub async fn update(&self, name: &str) -> CatalogueServiceResult<ServiceRecord> {
        let mut service = self.find_active_or_not_found(name).await?;

        let fetched = self
            .fetcher
            .fetch_tools(service.url())
            .await
            .map_err(|source| {
                warn!(service = %service.name(), error = %source, "tool refresh failed");
                CatalogueServiceError::Fetch {
                    name: service.name().clone(),
                    source,
                }
            })?;
        let tools = unique_tools(&service, fetched);

        service.touch(&*self.clock);
        self.repository
            .replace_tools(service.id(), &tools, service.updated_at())
            .await?;
        info!(service = %service.name(), tools = tools.len(), "updated service tools");

        self.bump_version().await?;
        Ok(service)
    }

    /// Soft-deletes an active service and its tools.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueServiceError::NotFound`] when no active service
    /// has the name, and repository or version store failures.
    pub async fn delete(&self, name: &str) -> CatalogueServiceResult<ServiceRecord> {
        let mut service = self.find_active_or_not_found(name).await?;
        let deleted_at = self.clock.utc();
        self.repository.soft_delete(service.id(), deleted_at).await?;
        service.mark_deleted(deleted_at);
        info!(service = %service.name(), "deleted service");

        self.bump_version().await?;
        Ok(service)
    }

    /// Lists active services with their stored tools, in registration order.
    ///
    /// # Errors
    ///
    /// Returns repository failures.
    pub async fn list(&self) -> CatalogueServiceResult<Vec<CatalogueEntry>> {
        Ok(self.repository.list_active().await?)
    }

    async fn find_active_or_not_found(&self, name: &str) -> CatalogueServiceResult<ServiceRecord> {
        let Ok(service_name) = ServiceName::new(name) else {
            return Err(CatalogueServiceError::NotFound(name.to_owned()));
        };
        self.repository
            .find_active_by_name(&service_name)
            .await?
            .ok_or_else(|| CatalogueServiceError::NotFound(service_name.as_str().to_owned()))
    }

    async fn bump_version(&self) -> CatalogueServiceResult<()> {
        let version = self.versions.bump().await?;
        info!(version = %version, "catalogue version bumped");
        Ok(())
    }
}

fn unique_tools(service: &ServiceRecord, fetched: Vec<ToolDescriptor>) -> Vec<ToolDescriptor> {
    let (tools, dropped) = dedupe_tools(fetched);
    if !dropped.is_empty() {
        warn!(
            service = %service.name(),
            dropped = ?dropped,
            "downstream reported duplicate tool names; keeping first occurrences"
        );
    }
    tools
}
