//! Adapter implementations for the catalogue ports.

pub mod memory;
pub mod postgres;
pub mod redis_version;

mod mcp_fetcher;

pub use mcp_fetcher::McpToolFetcher;
