//! Port for retrieving a downstream service's tool list.

use crate::catalogue::domain::{ServiceUrl, ToolDescriptor};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for tool fetches.
pub type ToolFetchResult<T> = Result<T, ToolFetchError>;

/// Retrieves the tools a downstream service currently exposes.
#[async_trait]
pub trait ToolFetcher: Send + Sync {
    /// Fetches the complete tool list from the service at `service_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolFetchError`] when the service cannot be reached or
    /// answers with something other than a tool list.
    async fn fetch_tools(&self, service_url: &ServiceUrl) -> ToolFetchResult<Vec<ToolDescriptor>>;
}

/// Failures while fetching a tool list.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolFetchError {
    /// The service could not be reached or did not answer in time.
    #[error("downstream service {url} is unreachable: {reason}")]
    Unreachable {
        /// Service base url.
        url: String,
        /// Failure description.
        reason: String,
    },

    /// The service answered but violated the protocol.
    #[error("downstream service {url} returned an invalid tool list: {reason}")]
    Protocol {
        /// Service base url.
        url: String,
        /// Failure description.
        reason: String,
    },
}
