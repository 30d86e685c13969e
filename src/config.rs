//! Gateway configuration.
//!
//! Settings come from an optional TOML file, then from environment
//! overrides, then from command-line flags applied by the binary. Every
//! field has a default so an empty file is a valid in-memory deployment.

use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Overrides the listen address.
pub const BIND_ENV: &str = "CONCOURSE_BIND";
/// Selects `PostgreSQL` storage with this connection url.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Selects the Redis version counter with this url.
pub const REDIS_URL_ENV: &str = "REDIS_URL";
/// Overrides the downstream timeout in milliseconds.
pub const DOWNSTREAM_TIMEOUT_ENV: &str = "CONCOURSE_DOWNSTREAM_TIMEOUT_MS";
/// Overrides the log output format.
pub const LOG_FORMAT_ENV: &str = "CONCOURSE_LOG_FORMAT";

const DEFAULT_BIND: &str = "0.0.0.0:3000";
const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;
const DEFAULT_SERVER_NAME: &str = "concourse";
const DEFAULT_CLIENT_NAME: &str = "concourse-client";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_VERSION_KEY: &str = "mcp:registry:version";
const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration failures. Raised only at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File path.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// An environment override holds an unusable value.
    #[error("invalid value for {variable}: {reason}")]
    InvalidOverride {
        /// Environment variable name.
        variable: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A setting fails validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level gateway configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Service catalogue storage.
    pub storage: StorageConfig,
    /// Shared catalogue version counter.
    pub version_counter: VersionCounterConfig,
    /// Downstream MCP client settings.
    pub downstream: DownstreamConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: String,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
    /// Name reported to MCP clients.
    pub server_name: String,
    /// Whether the `gateway-status` diagnostic tool is exposed.
    pub status_tool: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_owned(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            server_name: DEFAULT_SERVER_NAME.to_owned(),
            status_tool: false,
        }
    }
}

/// Service catalogue storage backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case", deny_unknown_fields)]
pub enum StorageConfig {
    /// Process-local storage; registrations are lost on restart.
    #[default]
    Memory,
    /// `PostgreSQL` storage.
    Postgres {
        /// Connection url.
        database_url: String,
        /// Pool size.
        #[serde(default = "default_max_connections")]
        max_connections: u32,
    },
}

/// Shared catalogue version counter backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case", deny_unknown_fields)]
pub enum VersionCounterConfig {
    /// Process-local counter; suitable for a single gateway instance.
    #[default]
    Memory,
    /// Redis counter shared by every gateway instance.
    Redis {
        /// Connection url.
        url: String,
        /// Key holding the version.
        #[serde(default = "default_version_key")]
        key: String,
    },
}

/// Downstream MCP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownstreamConfig {
    /// Budget for each downstream exchange, in milliseconds.
    pub timeout_ms: u64,
    /// Name the gateway reports when it initialises downstream sessions.
    pub client_name: String,
}

impl DownstreamConfig {
    /// Returns the timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            client_name: DEFAULT_CLIENT_NAME.to_owned(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_owned(),
            format: LogFormat::Text,
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from `path`, or defaults when `path` is `None`,
    /// then applies process environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or
    /// when the resulting settings are invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = path.map_or_else(|| Ok(Self::default()), Self::from_file)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file without applying overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parses TOML text without applying overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed input.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] for malformed values.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(bind) = lookup(BIND_ENV) {
            self.server.bind = bind;
        }

        if let Some(database_url) = lookup(DATABASE_URL_ENV) {
            let max_connections = match &self.storage {
                StorageConfig::Postgres {
                    max_connections, ..
                } => *max_connections,
                StorageConfig::Memory => DEFAULT_MAX_CONNECTIONS,
            };
            self.storage = StorageConfig::Postgres {
                database_url,
                max_connections,
            };
        }

        if let Some(url) = lookup(REDIS_URL_ENV) {
            let key = match &self.version_counter {
                VersionCounterConfig::Redis { key, .. } => key.clone(),
                VersionCounterConfig::Memory => default_version_key(),
            };
            self.version_counter = VersionCounterConfig::Redis { url, key };
        }

        if let Some(raw) = lookup(DOWNSTREAM_TIMEOUT_ENV) {
            self.downstream.timeout_ms =
                raw.trim()
                    .parse()
                    .map_err(|err: std::num::ParseIntError| ConfigError::InvalidOverride {
                        variable: DOWNSTREAM_TIMEOUT_ENV,
                        reason: err.to_string(),
                    })?;
        }

        if let Some(raw) = lookup(LOG_FORMAT_ENV) {
            self.logging.format =
                LogFormat::parse(&raw).ok_or_else(|| ConfigError::InvalidOverride {
                    variable: LOG_FORMAT_ENV,
                    reason: format!("expected 'text' or 'json', got '{raw}'"),
                })?;
        }

        Ok(())
    }

    /// Checks the configuration for unusable values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_address()?;
        if self.server.max_body_bytes == 0 {
            return Err(invalid("server.max_body_bytes must be greater than zero"));
        }
        if self.server.server_name.trim().is_empty() {
            return Err(invalid("server.server_name must not be empty"));
        }
        if self.downstream.timeout_ms == 0 {
            return Err(invalid("downstream.timeout_ms must be greater than zero"));
        }
        if self.downstream.client_name.trim().is_empty() {
            return Err(invalid("downstream.client_name must not be empty"));
        }

        if let StorageConfig::Postgres {
            database_url,
            max_connections,
        } = &self.storage
        {
            if database_url.trim().is_empty() {
                return Err(invalid("storage.database_url must not be empty"));
            }
            if *max_connections == 0 {
                return Err(invalid("storage.max_connections must be greater than zero"));
            }
        }

        if let VersionCounterConfig::Redis { url, key } = &self.version_counter {
            if url.trim().is_empty() {
                return Err(invalid("version_counter.url must not be empty"));
            }
            if key.trim().is_empty() {
                return Err(invalid("version_counter.key must not be empty"));
            }
        }

        Ok(())
    }

    /// Parses the listen address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `server.bind` is not a socket
    /// address.
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind.trim().parse().map_err(|_| {
            invalid(format!(
                "server.bind '{}' is not a socket address",
                self.server.bind
            ))
        })
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

const fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_version_key() -> String {
    DEFAULT_VERSION_KEY.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        move |name| values.get(name).cloned()
    }

    #[rstest]
    fn empty_file_yields_in_memory_defaults() {
        let config = GatewayConfig::from_toml("").expect("empty config parses");

        assert_eq!(config, GatewayConfig::default());
        assert_eq!(config.storage, StorageConfig::Memory);
        assert_eq!(config.version_counter, VersionCounterConfig::Memory);
        assert_eq!(config.downstream.timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[rstest]
    fn file_selects_backends() {
        let config = GatewayConfig::from_toml(
            r#"
            [server]
            bind = "127.0.0.1:4000"
            status_tool = true

            [storage]
            backend = "postgres"
            database_url = "postgres://gateway@localhost/catalogue"

            [version_counter]
            backend = "redis"
            url = "redis://localhost:6379"

            [logging]
            format = "json"
            "#,
        )
        .expect("config parses");

        assert!(config.server.status_tool);
        assert_eq!(
            config.storage,
            StorageConfig::Postgres {
                database_url: String::from("postgres://gateway@localhost/catalogue"),
                max_connections: 8,
            }
        );
        assert_eq!(
            config.version_counter,
            VersionCounterConfig::Redis {
                url: String::from("redis://localhost:6379"),
                key: String::from("mcp:registry:version"),
            }
        );
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[rstest]
    fn unknown_keys_are_rejected() {
        let result = GatewayConfig::from_toml("[server]\nport = 3000\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[rstest]
    fn environment_overrides_file_values() {
        let mut config = GatewayConfig::default();
        config
            .apply_env(lookup_from(&[
                (BIND_ENV, "127.0.0.1:9000"),
                (DATABASE_URL_ENV, "postgres://localhost/concourse"),
                (REDIS_URL_ENV, "redis://cache:6379"),
                (DOWNSTREAM_TIMEOUT_ENV, "2500"),
                (LOG_FORMAT_ENV, "JSON"),
            ]))
            .expect("overrides apply");

        assert_eq!(
            config.bind_address().expect("valid bind"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("literal address")
        );
        assert!(matches!(config.storage, StorageConfig::Postgres { .. }));
        assert!(matches!(
            config.version_counter,
            VersionCounterConfig::Redis { ref key, .. } if key == "mcp:registry:version"
        ));
        assert_eq!(config.downstream.timeout(), Duration::from_millis(2500));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[rstest]
    #[case(DOWNSTREAM_TIMEOUT_ENV, "soon")]
    #[case(LOG_FORMAT_ENV, "yaml")]
    fn malformed_overrides_are_rejected(#[case] variable: &str, #[case] value: &str) {
        let mut config = GatewayConfig::default();
        let result = config.apply_env(lookup_from(&[(variable, value)]));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidOverride { variable: rejected, .. }) if rejected == variable
        ));
    }

    #[rstest]
    #[case("[server]\nbind = \"localhost\"\n", "server.bind")]
    #[case("[server]\nmax_body_bytes = 0\n", "server.max_body_bytes")]
    #[case("[downstream]\ntimeout_ms = 0\n", "downstream.timeout_ms")]
    #[case(
        "[storage]\nbackend = \"postgres\"\ndatabase_url = \" \"\n",
        "storage.database_url"
    )]
    #[case(
        "[version_counter]\nbackend = \"redis\"\nurl = \"redis://x\"\nkey = \"\"\n",
        "version_counter.key"
    )]
    fn validation_names_the_offending_setting(#[case] content: &str, #[case] setting: &str) {
        let config = GatewayConfig::from_toml(content).expect("config parses");

        let error = config.validate().expect_err("validation fails");

        assert!(error.to_string().contains(setting), "{error}");
    }
}
