//! In-memory tool fetcher for deterministic tests.

use crate::catalogue::{
    domain::{ServiceUrl, ToolDescriptor},
    ports::{ToolFetchError, ToolFetchResult, ToolFetcher},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Tool fetcher that answers from a configurable table keyed by url.
///
/// Urls without an entry behave as unreachable services.
#[derive(Debug, Clone, Default)]
pub struct InMemoryToolFetcher {
    state: Arc<RwLock<HashMap<ServiceUrl, Option<Vec<ToolDescriptor>>>>>,
}

impl InMemoryToolFetcher {
    /// Creates a fetcher with no reachable services.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `tools` for `url`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`ToolFetchError`] when lock acquisition fails.
    pub fn set_tools(&self, url: &ServiceUrl, tools: Vec<ToolDescriptor>) -> ToolFetchResult<()> {
        self.write_entry(url, Some(tools))
    }

    /// Makes `url` behave as an unreachable service.
    ///
    /// # Errors
    ///
    /// Returns [`ToolFetchError`] when lock acquisition fails.
    pub fn set_unreachable(&self, url: &ServiceUrl) -> ToolFetchResult<()> {
        self.write_entry(url, None)
    }

    fn write_entry(
        &self,
        url: &ServiceUrl,
        entry: Option<Vec<ToolDescriptor>>,
    ) -> ToolFetchResult<()> {
        let mut state = self.state.write().map_err(|err| ToolFetchError::Unreachable {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        state.insert(url.clone(), entry);
        Ok(())
    }
}

#[async_trait]
impl ToolFetcher for InMemoryToolFetcher {
    async fn fetch_tools(&self, service_url: &ServiceUrl) -> ToolFetchResult<Vec<ToolDescriptor>> {
        let state = self.state.read().map_err(|err| ToolFetchError::Unreachable {
            url: service_url.to_string(),
            reason: err.to_string(),
        })?;
        state
            .get(service_url)
            .cloned()
            .flatten()
            .ok_or_else(|| ToolFetchError::Unreachable {
                url: service_url.to_string(),
                reason: String::from("connection refused"),
            })
    }
}
