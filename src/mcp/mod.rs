//! Model-context-protocol wire layer.
//!
//! JSON-RPC 2.0 message types, the MCP handshake and tool payloads, a
//! parser for `text/event-stream` replies, and a Streamable-HTTP client used
//! to talk to downstream services.

mod client;
mod error;
pub mod protocol;
mod sse;

pub use client::{DownstreamSession, McpHttpClient};
pub use error::{McpClientError, McpClientResult};
pub use sse::{SseEvent, parse_event_stream};
