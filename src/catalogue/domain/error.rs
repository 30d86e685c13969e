//! Error types for catalogue domain validation.

use thiserror::Error;

/// Errors returned while constructing catalogue domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogueDomainError {
    /// The service name is empty after trimming.
    #[error("service name must not be empty")]
    EmptyServiceName,

    /// The service name contains characters outside `[A-Za-z0-9_-]`.
    #[error(
        "service name '{0}' contains invalid characters (only letters, digits, '_' and '-' allowed)"
    )]
    InvalidServiceName(String),

    /// The service name exceeds the 100-character storage limit.
    #[error("service name exceeds 100 character limit: {0}")]
    ServiceNameTooLong(String),

    /// The service url is empty after trimming.
    #[error("service url must not be empty")]
    EmptyServiceUrl,

    /// The service url cannot be parsed as an absolute URL.
    #[error("service url '{url}' is not a valid absolute URL: {reason}")]
    InvalidServiceUrl {
        /// Rejected input.
        url: String,
        /// Parser failure description.
        reason: String,
    },

    /// The service url uses a scheme other than `http` or `https`.
    #[error("service url '{0}' must use the http or https scheme")]
    UnsupportedUrlScheme(String),

    /// The service url has no host component.
    #[error("service url '{0}' must include a host")]
    MissingUrlHost(String),

    /// A tool descriptor name is empty.
    #[error("tool name must not be empty")]
    EmptyToolName,
}
