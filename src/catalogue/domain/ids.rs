//! Identifier, validated-name, and url types for registered services.

use super::CatalogueDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;
use uuid::Uuid;

/// Maximum length for a service name, matching `VARCHAR(100)`.
const MAX_SERVICE_NAME_LENGTH: usize = 100;

/// Unique identifier for a service registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(Uuid);

impl ServiceId {
    /// Creates a new random service identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a service identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ServiceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated service name.
///
/// The name prefixes every federated tool name, so it may not contain the
/// `.` separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceName(String);

impl ServiceName {
    /// Creates a validated service name.
    ///
    /// The input is trimmed. Only ASCII letters, digits, `_` and `-` are
    /// accepted; case is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueDomainError`] when validation fails.
    pub fn new(value: impl Into<String>) -> Result<Self, CatalogueDomainError> {
        let trimmed = value.into().trim().to_owned();

        if trimmed.is_empty() {
            return Err(CatalogueDomainError::EmptyServiceName);
        }

        let is_valid = trimmed.chars().all(|character| {
            character.is_ascii_alphanumeric() || character == '_' || character == '-'
        });
        if !is_valid {
            return Err(CatalogueDomainError::InvalidServiceName(trimmed));
        }

        if trimmed.len() > MAX_SERVICE_NAME_LENGTH {
            return Err(CatalogueDomainError::ServiceNameTooLong(trimmed));
        }

        Ok(Self(trimmed))
    }

    /// Returns the service name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ServiceName {
    type Error = CatalogueDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServiceName> for String {
    fn from(value: ServiceName) -> Self {
        value.0
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Validated base url of a downstream MCP service.
///
/// Stored without a trailing `/`; the service's MCP endpoint is
/// [`ServiceUrl::mcp_endpoint`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceUrl(String);

impl ServiceUrl {
    /// Creates a validated service url.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueDomainError`] when the value is empty, does not
    /// parse, uses a scheme other than `http`/`https`, or has no host.
    pub fn new(value: impl Into<String>) -> Result<Self, CatalogueDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CatalogueDomainError::EmptyServiceUrl);
        }

        let parsed = Url::parse(trimmed).map_err(|err| CatalogueDomainError::InvalidServiceUrl {
            url: trimmed.to_owned(),
            reason: err.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CatalogueDomainError::UnsupportedUrlScheme(
                trimmed.to_owned(),
            ));
        }

        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(CatalogueDomainError::MissingUrlHost(trimmed.to_owned()));
        }

        Ok(Self(parsed.as_str().trim_end_matches('/').to_owned()))
    }

    /// Returns the base url as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the url of the service's MCP endpoint.
    #[must_use]
    pub fn mcp_endpoint(&self) -> String {
        format!("{}/mcp", self.0)
    }
}

impl TryFrom<String> for ServiceUrl {
    type Error = CatalogueDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServiceUrl> for String {
    fn from(value: ServiceUrl) -> Self {
        value.0
    }
}

impl AsRef<str> for ServiceUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ServiceUrl {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
