//! Shared world state for service catalogue BDD scenarios.

use std::sync::Arc;

use concourse::catalogue::{
    adapters::memory::{InMemoryCatalogueVersion, InMemoryServiceCatalogue, InMemoryToolFetcher},
    domain::{CatalogueVersion, ServiceRecord, ServiceUrl, ToolDescriptor},
    services::{CatalogueCache, CatalogueService, CatalogueServiceResult, RegisterServiceRequest},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Version counter used by the BDD world.
pub type TestVersions = InMemoryCatalogueVersion<DefaultClock>;

/// Catalogue service type used by the BDD world.
pub type TestCatalogueService =
    CatalogueService<InMemoryServiceCatalogue, TestVersions, InMemoryToolFetcher, DefaultClock>;

/// Catalogue cache type used by the BDD world.
pub type TestCatalogueCache = CatalogueCache<InMemoryServiceCatalogue, TestVersions>;

/// Scenario world for service catalogue behaviour tests.
pub struct CatalogueWorld {
    /// The catalogue service under test.
    pub service: TestCatalogueService,
    /// Cache serving the federated catalogue.
    pub cache: TestCatalogueCache,
    /// Scripted downstream tool lists.
    pub fetcher: Arc<InMemoryToolFetcher>,
    /// Version observed when the scenario started.
    pub initial_version: CatalogueVersion,
    /// Result of the last registration attempt.
    pub last_register_result: Option<CatalogueServiceResult<ServiceRecord>>,
    /// Result of the last update attempt.
    pub last_update_result: Option<CatalogueServiceResult<ServiceRecord>>,
}

impl CatalogueWorld {
    /// Creates a world with an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        let clock = Arc::new(DefaultClock);
        let repository = Arc::new(InMemoryServiceCatalogue::new());
        let versions = Arc::new(InMemoryCatalogueVersion::new(Arc::clone(&clock)));
        let fetcher = Arc::new(InMemoryToolFetcher::new());
        let service = CatalogueService::new(
            Arc::clone(&repository),
            Arc::clone(&versions),
            Arc::clone(&fetcher),
            clock,
        );
        Self {
            service,
            cache: CatalogueCache::new(repository, versions),
            fetcher,
            initial_version: CatalogueVersion::ZERO,
            last_register_result: None,
            last_update_result: None,
        }
    }
}

impl Default for CatalogueWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> CatalogueWorld {
    CatalogueWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Parses a comma-separated list of names.
pub fn split_names(names: &str) -> Vec<String> {
    names
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Builds an untyped descriptor for each name.
///
/// # Errors
///
/// Returns an error when a name is not a valid tool name.
pub fn descriptors(names: &str) -> Result<Vec<ToolDescriptor>, eyre::Report> {
    split_names(names)
        .into_iter()
        .map(|name| {
            ToolDescriptor::new(name.clone(), format!("{name} tool"), None)
                .map_err(|err| eyre::eyre!("invalid tool '{name}': {err}"))
        })
        .collect()
}

/// Parses a scenario url.
///
/// # Errors
///
/// Returns an error when the url is invalid.
pub fn service_url(raw: &str) -> Result<ServiceUrl, eyre::Report> {
    ServiceUrl::new(raw).map_err(|err| eyre::eyre!("invalid url '{raw}': {err}"))
}

/// Builds a registration request.
pub fn request(name: &str, url: &str) -> RegisterServiceRequest {
    RegisterServiceRequest::new(name, url)
}
