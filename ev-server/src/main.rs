//! Element Variants Server Binary
//!
//! ## Usage
//!
//! ```bash
//! # Start with defaults (port 8430, in-memory store)
//! ev-server
//!
//! # Custom port, persisted to a JSON file
//! EV_PORT=3000 EV_DATA_FILE=./data/sites.json ev-server
//!
//! # Public URL used in embed snippets
//! EV_PUBLIC_URL=https://variants.example.com ev-server
//! ```

use ev_server::{open_store, ServerConfig, VariantServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ev_server=info,ev_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    let store = match open_store(&config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "failed to open storage");
            return Err(e.into());
        }
    };

    tracing::info!(
        port = config.port,
        cors = config.cors_enabled,
        storage = store.name(),
        "Starting Element Variants server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let server = VariantServer::new(store, config);
    server.run().await?;

    Ok(())
}
