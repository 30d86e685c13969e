//! Application services for catalogue mutations and cached reads.

mod cache;
mod registry;

pub use cache::{CatalogueCache, CatalogueCacheError, CatalogueCacheResult, CatalogueSnapshot};
pub use registry::{
    CatalogueService, CatalogueServiceError, CatalogueServiceResult, RegisterServiceRequest,
};
