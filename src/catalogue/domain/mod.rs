//! Domain model for registered services and their tools.
//!
//! Services are identified internally by UUID and externally by a validated
//! name that also prefixes every federated tool name. Infrastructure
//! concerns remain outside this boundary.

mod error;
mod ids;
mod registered;
mod service;
mod tool;
mod version;

pub use error::CatalogueDomainError;
pub use ids::{ServiceId, ServiceName, ServiceUrl};
pub use registered::{RegisteredTool, TOOL_NAME_SEPARATOR, ToolInputSchema};
pub use service::{CatalogueEntry, PersistedServiceData, ServiceRecord, ServiceTools};
pub use tool::{ToolDescriptor, dedupe_tools};
pub use version::CatalogueVersion;
