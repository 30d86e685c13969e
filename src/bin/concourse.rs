//! Runs the Concourse gateway.
//!
//! Usage:
//!
//! ```text
//! concourse [--config <path>] [--bind <addr>] [--apply-schema]
//! ```
//!
//! Configuration comes from the optional TOML file, then `CONCOURSE_*`
//! environment overrides, then the command line. A minimal file is:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:3000"
//!
//! [storage]
//! backend = "postgres"
//! database_url = "postgres://concourse@localhost/concourse"
//!
//! [version_counter]
//! backend = "redis"
//! url = "redis://localhost:6379"
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use concourse::catalogue::{
    adapters::{
        McpToolFetcher,
        memory::{InMemoryCatalogueVersion, InMemoryServiceCatalogue},
        postgres::{CataloguePgPool, PostgresServiceCatalogue},
        redis_version::RedisCatalogueVersion,
    },
    ports::{CatalogueVersionStore, ServiceCatalogueRepository},
    services::{CatalogueCache, CatalogueService},
};
use concourse::config::{GatewayConfig, StorageConfig, VersionCounterConfig};
use concourse::gateway::{EndpointSettings, McpToolForwarder, http};
use concourse::mcp::{McpHttpClient, protocol::Implementation};
use concourse::telemetry;
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Parser)]
#[command(name = "concourse", version, about = "Federating gateway for MCP tool services")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Listen address, overriding the configured one.
    #[arg(long)]
    bind: Option<String>,

    /// Create the catalogue tables before serving (PostgreSQL only).
    #[arg(long)]
    apply_schema: bool,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let mut config = GatewayConfig::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
        config.validate()?;
    }
    telemetry::init_tracing(&config.logging)?;

    let clock = Arc::new(DefaultClock);
    match config.storage.clone() {
        StorageConfig::Memory => {
            if cli.apply_schema {
                warn!("--apply-schema has no effect with in-memory storage");
            }
            info!("using in-memory service catalogue");
            with_version_counter(&config, Arc::new(InMemoryServiceCatalogue::new()), clock).await
        }
        StorageConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = connect_pool(database_url, max_connections).await?;
            let repository = PostgresServiceCatalogue::new(pool);
            if cli.apply_schema {
                repository.apply_schema().await?;
                info!("catalogue schema applied");
            }
            info!("using PostgreSQL service catalogue");
            with_version_counter(&config, Arc::new(repository), clock).await
        }
    }
}

async fn connect_pool(database_url: String, max_connections: u32) -> Result<CataloguePgPool, BoxError> {
    let pool = tokio::task::spawn_blocking(move || {
        Pool::builder()
            .max_size(max_connections)
            .build(ConnectionManager::<PgConnection>::new(database_url))
    })
    .await??;
    Ok(pool)
}

async fn with_version_counter<R>(
    config: &GatewayConfig,
    repository: Arc<R>,
    clock: Arc<DefaultClock>,
) -> Result<(), BoxError>
where
    R: ServiceCatalogueRepository + 'static,
{
    match &config.version_counter {
        VersionCounterConfig::Memory => {
            let versions = Arc::new(InMemoryCatalogueVersion::new(Arc::clone(&clock)));
            run(config, repository, versions, clock).await
        }
        VersionCounterConfig::Redis { url, key } => {
            let versions = RedisCatalogueVersion::connect(url, key.clone(), Arc::clone(&clock)).await?;
            info!(key = versions.key(), "using Redis catalogue version counter");
            run(config, repository, Arc::new(versions), clock).await
        }
    }
}

async fn run<R, V>(
    config: &GatewayConfig,
    repository: Arc<R>,
    versions: Arc<V>,
    clock: Arc<DefaultClock>,
) -> Result<(), BoxError>
where
    R: ServiceCatalogueRepository + 'static,
    V: CatalogueVersionStore + 'static,
{
    let package_version = env!("CARGO_PKG_VERSION");
    let client = McpHttpClient::new(
        Implementation::new(config.downstream.client_name.clone(), package_version),
        config.downstream.timeout(),
    )?;

    let registry = Arc::new(CatalogueService::new(
        Arc::clone(&repository),
        Arc::clone(&versions),
        Arc::new(McpToolFetcher::new(client.clone())),
        clock,
    ));
    let cache = Arc::new(CatalogueCache::new(repository, versions));
    let snapshot = cache.warm().await?;
    info!(
        version = %snapshot.version(),
        tools = snapshot.len(),
        "catalogue loaded"
    );

    let settings = EndpointSettings::new(Implementation::new(
        config.server.server_name.clone(),
        package_version,
    ))
    .with_status_tool(config.server.status_tool);
    let forwarder = Arc::new(McpToolForwarder::new(client, config.downstream.timeout()));
    let state = http::GatewayState::new(cache, registry, forwarder, settings)
        .with_max_body_bytes(config.server.max_body_bytes);

    let listener = TcpListener::bind(config.bind_address()?).await?;
    http::serve(listener, state, shutdown_signal()).await?;
    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
