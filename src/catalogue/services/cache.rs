//! Version-checked in-process cache of the federated tool catalogue.

use crate::catalogue::{
    domain::{CatalogueEntry, CatalogueVersion, RegisteredTool},
    ports::{
        CatalogueVersionError, CatalogueVersionStore, ServiceCatalogueError,
        ServiceCatalogueRepository,
    },
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{info, warn};

/// Immutable view of the federated catalogue at one version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogueSnapshot {
    version: CatalogueVersion,
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl CatalogueSnapshot {
    /// Creates an empty snapshot at [`CatalogueVersion::ZERO`].
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Flattens active services into federated tools.
    ///
    /// Order follows service registration order, then downstream tool
    /// order. Tools whose schema cannot be translated are skipped.
    #[must_use]
    pub fn build(version: CatalogueVersion, entries: &[CatalogueEntry]) -> Self {
        let mut tools = Vec::new();
        let mut index = HashMap::new();

        for entry in entries {
            let service = &entry.service;
            for tool in &entry.tools {
                match RegisteredTool::federate(service.name(), service.url(), tool) {
                    Ok(registered) => {
                        if index.contains_key(registered.name()) {
                            warn!(tool = %registered.name(), "skipping duplicate federated tool");
                            continue;
                        }
                        index.insert(registered.name().to_owned(), tools.len());
                        tools.push(registered);
                    }
                    Err(err) => warn!(
                        service = %service.name(),
                        tool = %tool.name(),
                        error = %err,
                        "skipping tool with untranslatable input schema"
                    ),
                }
            }
        }

        Self {
            version,
            tools,
            index,
        }
    }

    /// Returns the catalogue version this snapshot reflects.
    #[must_use]
    pub const fn version(&self) -> CatalogueVersion {
        self.version
    }

    /// Returns all federated tools in catalogue order.
    #[must_use]
    pub fn tools(&self) -> &[RegisteredTool] {
        &self.tools
    }

    /// Looks up a tool by its federated name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&RegisteredTool> {
        self.index
            .get(name)
            .and_then(|position| self.tools.get(*position))
    }

    /// Returns the number of federated tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns whether the catalogue holds no tools.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Failures while reading the catalogue.
#[derive(Debug, Clone, Error)]
pub enum CatalogueCacheError {
    /// The shared version could not be read.
    #[error(transparent)]
    Version(#[from] CatalogueVersionError),
    /// Active services could not be loaded.
    #[error(transparent)]
    Repository(#[from] ServiceCatalogueError),
    /// The snapshot lock was poisoned by a panicking writer.
    #[error("catalogue snapshot lock poisoned")]
    LockPoisoned,
}

/// Result type for cache reads.
pub type CatalogueCacheResult<T> = Result<T, CatalogueCacheError>;

/// In-process catalogue cache keyed to the shared version counter.
///
/// Reads compare the shared version with the cached one and reload from the
/// repository only when the shared version is newer. Snapshots are swapped
/// atomically and never move to an older version.
pub struct CatalogueCache<R, V>
where
    R: ServiceCatalogueRepository,
    V: CatalogueVersionStore,
{
    repository: Arc<R>,
    versions: Arc<V>,
    snapshot: RwLock<Arc<CatalogueSnapshot>>,
    reloads: AtomicU64,
}

impl<R, V> CatalogueCache<R, V>
where
    R: ServiceCatalogueRepository,
    V: CatalogueVersionStore,
{
    /// Creates a cache holding an empty snapshot.
    #[must_use]
    pub fn new(repository: Arc<R>, versions: Arc<V>) -> Self {
        Self {
            repository,
            versions,
            snapshot: RwLock::new(Arc::new(CatalogueSnapshot::empty())),
            reloads: AtomicU64::new(0),
        }
    }

    /// Returns the current catalogue, reloading first when stale.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueCacheError`] when the version or the active
    /// services cannot be read.
    pub async fn get_all_tools(&self) -> CatalogueCacheResult<Arc<CatalogueSnapshot>> {
        let latest = self.versions.current().await?;
        let cached = self.current_snapshot()?;
        if latest <= cached.version() {
            return Ok(cached);
        }
        self.reload(latest).await
    }

    /// Loads the catalogue unconditionally.
    ///
    /// Used at startup so that an unset version counter does not hide
    /// services already in the repository.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueCacheError`] when the version or the active
    /// services cannot be read.
    pub async fn warm(&self) -> CatalogueCacheResult<Arc<CatalogueSnapshot>> {
        let latest = self.versions.current().await?;
        self.reload(latest).await
    }

    /// Returns the number of reloads performed so far.
    #[must_use]
    pub fn reload_count(&self) -> u64 {
        self.reloads.load(Ordering::Relaxed)
    }

    fn current_snapshot(&self) -> CatalogueCacheResult<Arc<CatalogueSnapshot>> {
        self.snapshot
            .read()
            .map(|guard| Arc::clone(&guard))
            .map_err(|_| CatalogueCacheError::LockPoisoned)
    }

    async fn reload(&self, version: CatalogueVersion) -> CatalogueCacheResult<Arc<CatalogueSnapshot>> {
        let entries = self.repository.list_active().await?;
        let fresh = Arc::new(CatalogueSnapshot::build(version, &entries));
        self.reloads.fetch_add(1, Ordering::Relaxed);

        let mut guard = self
            .snapshot
            .write()
            .map_err(|_| CatalogueCacheError::LockPoisoned)?;
        if fresh.version() < guard.version() {
            return Ok(Arc::clone(&guard));
        }

        *guard = Arc::clone(&fresh);
        info!(
            version = %fresh.version(),
            services = entries.len(),
            tools = fresh.len(),
            "catalogue reloaded"
        );
        Ok(fresh)
    }
}
