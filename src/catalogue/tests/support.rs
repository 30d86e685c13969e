//! Shared builders for catalogue unit tests.

use crate::catalogue::{
    adapters::memory::{InMemoryCatalogueVersion, InMemoryServiceCatalogue, InMemoryToolFetcher},
    domain::{ServiceUrl, ToolDescriptor},
    services::{CatalogueCache, CatalogueService},
};
use mockable::DefaultClock;
use serde_json::{Value, json};
use std::sync::Arc;

pub type MemoryService = CatalogueService<
    InMemoryServiceCatalogue,
    InMemoryCatalogueVersion<DefaultClock>,
    InMemoryToolFetcher,
    DefaultClock,
>;

pub type MemoryCache =
    CatalogueCache<InMemoryServiceCatalogue, InMemoryCatalogueVersion<DefaultClock>>;

pub struct Harness {
    pub repository: Arc<InMemoryServiceCatalogue>,
    pub versions: Arc<InMemoryCatalogueVersion<DefaultClock>>,
    pub fetcher: Arc<InMemoryToolFetcher>,
    pub service: Arc<MemoryService>,
    pub cache: MemoryCache,
}

pub fn harness() -> Harness {
    let clock = Arc::new(DefaultClock);
    let repository = Arc::new(InMemoryServiceCatalogue::new());
    let versions = Arc::new(InMemoryCatalogueVersion::new(Arc::clone(&clock)));
    let fetcher = Arc::new(InMemoryToolFetcher::new());
    let service = Arc::new(CatalogueService::new(
        Arc::clone(&repository),
        Arc::clone(&versions),
        Arc::clone(&fetcher),
        clock,
    ));
    let cache = CatalogueCache::new(Arc::clone(&repository), Arc::clone(&versions));
    Harness {
        repository,
        versions,
        fetcher,
        service,
        cache,
    }
}

pub fn url(raw: &str) -> ServiceUrl {
    ServiceUrl::new(raw).expect("valid service url")
}

pub fn tool(name: &str, schema: Option<Value>) -> ToolDescriptor {
    ToolDescriptor::new(name, format!("{name} tool"), schema).expect("valid tool descriptor")
}

pub fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({ "type": "object", "properties": properties, "required": required })
}

pub fn shopping_tools() -> Vec<ToolDescriptor> {
    vec![
        tool(
            "getProductById",
            Some(object_schema(json!({ "id": { "type": "string" } }), &["id"])),
        ),
        tool(
            "searchProducts",
            Some(object_schema(
                json!({ "query": { "type": "string" }, "limit": { "type": "integer" } }),
                &["query"],
            )),
        ),
    ]
}
