//! Tool federation gateway.
//!
//! Each inbound `POST /mcp` exchange reads the catalogue snapshot, opens a
//! [`VirtualEndpoint`] exposing exactly those tools, and forwards every
//! tool call to its owning service through a [`ToolForwarder`]. The
//! registry API in [`http`] mutates the catalogue.

mod endpoint;
mod forward;
pub mod http;
mod ports;

pub use endpoint::{EndpointSettings, STATUS_TOOL_NAME, VirtualEndpoint};
pub use forward::McpToolForwarder;
pub use ports::{ForwardError, ForwardResult, ServiceRegistry, ToolCatalogue, ToolForwarder};

#[cfg(test)]
mod tests;
