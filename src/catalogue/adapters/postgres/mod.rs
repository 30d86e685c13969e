//! `PostgreSQL` adapters for service catalogue persistence.

mod models;
mod repository;
mod schema;

pub use repository::{CATALOGUE_SCHEMA_SQL, CataloguePgPool, PostgresServiceCatalogue};
