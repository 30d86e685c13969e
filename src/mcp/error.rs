//! Errors raised while talking to downstream MCP services.

use thiserror::Error;

/// Result type for downstream MCP client operations.
pub type McpClientResult<T> = Result<T, McpClientError>;

/// Failures of a downstream MCP exchange.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum McpClientError {
    /// The request could not be delivered or the reply could not be read.
    #[error("request to {endpoint} failed: {reason}")]
    Transport {
        /// Downstream endpoint.
        endpoint: String,
        /// Failure description.
        reason: String,
    },

    /// The downstream did not answer within the configured timeout.
    #[error("request to {endpoint} timed out")]
    Timeout {
        /// Downstream endpoint.
        endpoint: String,
    },

    /// The downstream answered with a non-success HTTP status.
    #[error("{endpoint} answered HTTP {status}")]
    HttpStatus {
        /// Downstream endpoint.
        endpoint: String,
        /// HTTP status code.
        status: u16,
    },

    /// The reply was not a well-formed MCP response.
    #[error("invalid response from {endpoint}: {reason}")]
    Protocol {
        /// Downstream endpoint.
        endpoint: String,
        /// Failure description.
        reason: String,
    },

    /// The downstream answered with a JSON-RPC error.
    #[error("{message}")]
    JsonRpc {
        /// Downstream endpoint.
        endpoint: String,
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },
}

impl McpClientError {
    /// Returns whether the failure means the downstream could not be
    /// reached at all.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Timeout { .. } | Self::HttpStatus { .. }
        )
    }

    pub(crate) fn from_reqwest(endpoint: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                endpoint: endpoint.to_owned(),
            }
        } else {
            Self::Transport {
                endpoint: endpoint.to_owned(),
                reason: err.to_string(),
            }
        }
    }

    pub(crate) fn protocol(endpoint: &str, reason: impl Into<String>) -> Self {
        Self::Protocol {
            endpoint: endpoint.to_owned(),
            reason: reason.into(),
        }
    }
}
