//! Service catalogue: registration records, tool lists, and the cached
//! federated tool set.
//!
//! Downstream MCP services register under a unique name and url. Their tool
//! lists are fetched at registration and on explicit update, stored beside
//! the service record, and flattened into the gateway's federated catalogue
//! whenever the shared catalogue version moves. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
