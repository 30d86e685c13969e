//! Port contracts for the service catalogue.

mod fetcher;
mod repository;
mod version;

pub use fetcher::{ToolFetchError, ToolFetchResult, ToolFetcher};
pub use repository::{ServiceCatalogueError, ServiceCatalogueRepository, ServiceCatalogueResult};
pub use version::{CatalogueVersionError, CatalogueVersionResult, CatalogueVersionStore};
