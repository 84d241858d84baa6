//! Element Variants Server - HTTP surface for ev-core
//!
//! Two audiences share one process:
//!
//! - **Embedded script**: `POST /api/integration/variants` authenticated by
//!   the site's API key, plus the loader script itself
//! - **Dashboard**: the `/api/websites`, `/api/elements`, `/api/variants` and
//!   `/api/conditions` management API, authenticated by the `X-User-Id`
//!   header set by the upstream proxy
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                    VariantServer                      │
//! │   ┌────────────────────┐   ┌────────────────────┐    │
//! │   │ IntegrationService │   │      Catalog       │    │
//! │   └─────────┬──────────┘   └─────────┬──────────┘    │
//! │             └───────────┬────────────┘               │
//! │                         ▼                            │
//! │               Arc<dyn SiteStore>                     │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The server is a thin wrapper - resolution and validation live in `ev-core`.

pub mod auth;
pub mod routes;
mod config;

pub use config::{ServerConfig, ServerConfigBuilder, DEFAULT_PORT};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use ev_core::{Catalog, FileStore, InMemoryStore, IntegrationService, SiteStore};

/// Shared application state
pub struct AppState {
    pub integration: IntegrationService,
    pub catalog: Catalog,
    pub store: Arc<dyn SiteStore>,
    pub config: ServerConfig,
}

impl AppState {
    /// Create new app state over the given store
    pub fn new(store: Arc<dyn SiteStore>, config: ServerConfig) -> Self {
        Self {
            integration: IntegrationService::new(Arc::clone(&store)),
            catalog: Catalog::new(Arc::clone(&store)),
            store,
            config,
        }
    }
}

/// Open the store selected by the configuration
pub fn open_store(config: &ServerConfig) -> ev_core::Result<Arc<dyn SiteStore>> {
    let store: Arc<dyn SiteStore> = match &config.data_file {
        Some(path) => Arc::new(FileStore::open(path.clone())?),
        None => Arc::new(InMemoryStore::new()),
    };
    Ok(store)
}

/// Element Variants HTTP Server
///
/// # Example
///
/// ```rust,ignore
/// use ev_server::{open_store, ServerConfig, VariantServer};
///
/// #[tokio::main]
/// async fn main() {
///     let config = ServerConfig::builder().port(8430).build();
///     let store = open_store(&config).unwrap();
///
///     let server = VariantServer::new(store, config);
///     server.run().await.unwrap();
/// }
/// ```
pub struct VariantServer {
    state: Arc<AppState>,
}

impl VariantServer {
    pub fn new(store: Arc<dyn SiteStore>, config: ServerConfig) -> Self {
        Self {
            state: Arc::new(AppState::new(store, config)),
        }
    }

    /// Build the Axum router with all routes
    pub fn router(&self) -> Router {
        routes::create_router(Arc::clone(&self.state))
    }

    /// Get the socket address for the server
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.state.config.port))
    }

    /// Run the server
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();
        let addr = self.addr();

        tracing::info!("Element Variants server listening on http://{}", addr);
        tracing::info!(storage = self.state.store.name(), "storage backend ready");
        tracing::info!("Endpoints:");
        tracing::info!("  GET  /health");
        tracing::info!("  POST /api/integration/variants");
        tracing::info!("  GET  /api/integration/widget.js");
        tracing::info!("  *    /api/websites, /api/elements, /api/variants, /api/conditions");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
