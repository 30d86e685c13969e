//! Port for the shared catalogue version counter.

use crate::catalogue::domain::CatalogueVersion;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for version store operations.
pub type CatalogueVersionResult<T> = Result<T, CatalogueVersionError>;

/// Shared monotonic counter coordinating catalogue caches across replicas.
#[async_trait]
pub trait CatalogueVersionStore: Send + Sync {
    /// Reads the current version; an unset counter reads as
    /// [`CatalogueVersion::ZERO`].
    async fn current(&self) -> CatalogueVersionResult<CatalogueVersion>;

    /// Atomically moves the version forward and returns the new value.
    async fn bump(&self) -> CatalogueVersionResult<CatalogueVersion>;
}

/// Failures of the version store.
#[derive(Debug, Clone, Error)]
pub enum CatalogueVersionError {
    /// The backing store could not be reached.
    #[error("catalogue version store unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),

    /// The stored value is not a valid version.
    #[error("catalogue version store holds an invalid value: {0}")]
    InvalidValue(String),
}

impl CatalogueVersionError {
    /// Wraps a backing-store failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
