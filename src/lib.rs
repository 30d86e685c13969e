//! Concourse: a federating gateway for model-context-protocol tool services.
//!
//! Downstream MCP services are registered by name and URL. Their tools are
//! fetched, namespaced as `<service>.<tool>` and served to clients from a
//! single MCP endpoint; calls are validated and forwarded to the owning
//! service.
//!
//! # Architecture
//!
//! Concourse follows hexagonal architecture principles:
//!
//! - **Domain**: service records, tool descriptors and argument schemas
//! - **Ports**: catalogue storage, version counter and tool fetching traits
//! - **Adapters**: in-memory, `PostgreSQL`, Redis and MCP client implementations
//!
//! # Modules
//!
//! - [`catalogue`]: registration, storage and the cached federated catalogue
//! - [`gateway`]: the inbound MCP endpoint and the registry HTTP API
//! - [`schema`]: translation of declared tool schemas into argument validators
//! - [`mcp`]: JSON-RPC types and the downstream streamable HTTP client
//! - [`config`]: TOML and environment configuration
//! - [`telemetry`]: `tracing` subscriber setup

pub mod catalogue;
pub mod config;
pub mod gateway;
pub mod mcp;
pub mod schema;
pub mod telemetry;
