//! Repository port for service records and their tool lists.

use crate::catalogue::domain::{
    CatalogueEntry, ServiceId, ServiceName, ServiceRecord, ServiceTools, ServiceUrl,
    ToolDescriptor,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for service catalogue repository operations.
pub type ServiceCatalogueResult<T> = Result<T, ServiceCatalogueError>;

/// Persistence contract for registered services.
///
/// Name and url are unique among active records. Implementations enforce
/// uniqueness atomically so that concurrent inserts of the same name or url
/// produce exactly one success.
#[async_trait]
pub trait ServiceCatalogueRepository: Send + Sync {
    /// Stores a new service record together with an empty tool list.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceCatalogueError::DuplicateServiceName`] or
    /// [`ServiceCatalogueError::DuplicateServiceUrl`] when an active record
    /// already holds the name or url.
    async fn insert(&self, service: &ServiceRecord) -> ServiceCatalogueResult<()>;

    /// Replaces the tool list of an active service and stamps the record's
    /// update time.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceCatalogueError::NotFound`] when no active service has
    /// the identifier.
    async fn replace_tools(
        &self,
        service_id: ServiceId,
        tools: &[ToolDescriptor],
        updated_at: DateTime<Utc>,
    ) -> ServiceCatalogueResult<()>;

    /// Finds the active service with the given name.
    async fn find_active_by_name(
        &self,
        name: &ServiceName,
    ) -> ServiceCatalogueResult<Option<ServiceRecord>>;

    /// Finds a service by identifier, including soft-deleted records.
    async fn find_by_id(&self, service_id: ServiceId)
    -> ServiceCatalogueResult<Option<ServiceRecord>>;

    /// Returns the stored tool list of a service, including soft-deleted
    /// lists.
    async fn find_tools(&self, service_id: ServiceId)
    -> ServiceCatalogueResult<Option<ServiceTools>>;

    /// Soft-deletes an active service and its tool list.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceCatalogueError::NotFound`] when no active service has
    /// the identifier.
    async fn soft_delete(
        &self,
        service_id: ServiceId,
        deleted_at: DateTime<Utc>,
    ) -> ServiceCatalogueResult<()>;

    /// Returns every active service with its tools, in registration order.
    async fn list_active(&self) -> ServiceCatalogueResult<Vec<CatalogueEntry>>;
}

/// Errors returned by service catalogue repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ServiceCatalogueError {
    /// An active service already uses the name.
    #[error("a service named '{0}' is already registered")]
    DuplicateServiceName(ServiceName),

    /// An active service already uses the url.
    #[error("a service with url '{0}' is already registered")]
    DuplicateServiceUrl(ServiceUrl),

    /// No active service has the identifier.
    #[error("service not found: {0}")]
    NotFound(ServiceId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted service data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ServiceCatalogueError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns whether the error reports a uniqueness conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::DuplicateServiceName(_) | Self::DuplicateServiceUrl(_)
        )
    }
}
