//! In-memory adapters for tests and single-process deployments.

mod fetcher;
mod repository;
mod version;

pub use fetcher::InMemoryToolFetcher;
pub use repository::InMemoryServiceCatalogue;
pub use version::InMemoryCatalogueVersion;
