//! Redis-backed catalogue version counter shared by gateway replicas.

use crate::catalogue::{
    domain::CatalogueVersion,
    ports::{CatalogueVersionError, CatalogueVersionResult, CatalogueVersionStore},
};
use async_trait::async_trait;
use mockable::Clock;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use tracing::debug;

/// Default key holding the catalogue version.
pub const DEFAULT_VERSION_KEY: &str = "mcp:registry:version";

/// Sets the key to `max(current + 1, now)` and returns the new value.
const BUMP_SCRIPT: &str = r"
local current = tonumber(redis.call('GET', KEYS[1]) or '0') or 0
local now = tonumber(ARGV[1])
local next = current + 1
if now > next then
    next = now
end
redis.call('SET', KEYS[1], string.format('%d', next))
return next
";

/// Catalogue version stored under a single Redis key.
pub struct RedisCatalogueVersion<C>
where
    C: Clock + Send + Sync,
{
    connection: ConnectionManager,
    key: String,
    clock: Arc<C>,
}

impl<C> RedisCatalogueVersion<C>
where
    C: Clock + Send + Sync,
{
    /// Connects to Redis at `url` and uses `key` for the version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueVersionError::Unavailable`] when the url is
    /// invalid or the server cannot be reached.
    pub async fn connect(
        url: &str,
        key: impl Into<String>,
        clock: Arc<C>,
    ) -> CatalogueVersionResult<Self> {
        let client = redis::Client::open(url).map_err(CatalogueVersionError::unavailable)?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(CatalogueVersionError::unavailable)?;
        Ok(Self {
            connection,
            key: key.into(),
            clock,
        })
    }

    /// Returns the key holding the version.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl<C> CatalogueVersionStore for RedisCatalogueVersion<C>
where
    C: Clock + Send + Sync,
{
    async fn current(&self) -> CatalogueVersionResult<CatalogueVersion> {
        let mut connection = self.connection.clone();
        let stored: Option<String> = redis::cmd("GET")
            .arg(&self.key)
            .query_async(&mut connection)
            .await
            .map_err(CatalogueVersionError::unavailable)?;

        stored.map_or(Ok(CatalogueVersion::ZERO), |raw| {
            raw.trim()
                .parse::<i64>()
                .map(CatalogueVersion::new)
                .map_err(|_| CatalogueVersionError::InvalidValue(raw))
        })
    }

    async fn bump(&self) -> CatalogueVersionResult<CatalogueVersion> {
        let mut connection = self.connection.clone();
        let now = self.clock.utc().timestamp_millis();
        let next: i64 = redis::Script::new(BUMP_SCRIPT)
            .key(&self.key)
            .arg(now)
            .invoke_async(&mut connection)
            .await
            .map_err(CatalogueVersionError::unavailable)?;
        debug!(key = %self.key, version = next, "bumped catalogue version");
        Ok(CatalogueVersion::new(next))
    }
}
