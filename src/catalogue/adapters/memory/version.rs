//! In-process catalogue version counter.

use crate::catalogue::{
    domain::CatalogueVersion,
    ports::{CatalogueVersionResult, CatalogueVersionStore},
};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Version counter held in process memory.
///
/// Suitable for a single gateway instance; replicas need a shared store.
#[derive(Debug)]
pub struct InMemoryCatalogueVersion<C>
where
    C: Clock + Send + Sync,
{
    value: AtomicI64,
    clock: Arc<C>,
}

impl<C> InMemoryCatalogueVersion<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an unset counter.
    #[must_use]
    pub const fn new(clock: Arc<C>) -> Self {
        Self {
            value: AtomicI64::new(0),
            clock,
        }
    }

    /// Overwrites the counter, as another replica's bump would.
    pub fn set(&self, version: CatalogueVersion) {
        self.value.store(version.value(), Ordering::SeqCst);
    }
}

#[async_trait]
impl<C> CatalogueVersionStore for InMemoryCatalogueVersion<C>
where
    C: Clock + Send + Sync,
{
    async fn current(&self) -> CatalogueVersionResult<CatalogueVersion> {
        Ok(CatalogueVersion::new(self.value.load(Ordering::SeqCst)))
    }

    async fn bump(&self) -> CatalogueVersionResult<CatalogueVersion> {
        let now = self.clock.utc();
        let advance = |raw: i64| CatalogueVersion::new(raw).next_after(now);
        let previous = self
            .value
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |raw| {
                Some(advance(raw).value())
            })
            .unwrap_or_else(|raw| raw);
        Ok(advance(previous))
    }
}
