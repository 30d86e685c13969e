//! Axum front end: the inbound MCP endpoint and the registry API.
//!
//! Routes:
//!
//! - `POST /mcp` serves the federated catalogue over MCP.
//! - `POST /register`, `PUT /update/{name}`, `DELETE /delete/{name}` and
//!   `GET /services` manage downstream services.

mod error;
mod mcp;
mod registry;

pub use error::ApiError;

use super::endpoint::EndpointSettings;
use super::ports::{ServiceRegistry, ToolCatalogue, ToolForwarder};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Default cap on inbound request bodies.
pub const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct GatewayState {
    catalogue: Arc<dyn ToolCatalogue>,
    registry: Arc<dyn ServiceRegistry>,
    forwarder: Arc<dyn ToolForwarder>,
    settings: Arc<EndpointSettings>,
    max_body_bytes: usize,
}

impl GatewayState {
    /// Creates handler state.
    #[must_use]
    pub fn new(
        catalogue: Arc<dyn ToolCatalogue>,
        registry: Arc<dyn ServiceRegistry>,
        forwarder: Arc<dyn ToolForwarder>,
        settings: EndpointSettings,
    ) -> Self {
        Self {
            catalogue,
            registry,
            forwarder,
            settings: Arc::new(settings),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Overrides the request body cap.
    #[must_use]
    pub const fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

/// Builds the gateway router.
#[must_use]
pub fn router(state: GatewayState) -> Router {
    let body_limit = state.max_body_bytes;
    Router::new()
        .route(
            "/mcp",
            post(mcp::handle_mcp)
                .get(mcp::method_not_allowed)
                .delete(mcp::method_not_allowed),
        )
        .route("/register", post(registry::register_service))
        .route("/update/{name}", put(registry::update_service))
        .route("/delete/{name}", delete(registry::delete_service))
        .route("/services", get(registry::list_services))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Serves the gateway on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve(
    listener: TcpListener,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(address) = listener.local_addr() {
        info!(%address, "gateway listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
