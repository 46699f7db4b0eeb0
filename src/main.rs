//! Market API - item catalog and market order HTTP service
//!
//! Loads the catalog and order schema, then serves the HTTP API.

use std::fs;
use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use market_api::orders::DEFAULT_SCHEMA;
use market_api::{create_router, spawn_cleanup_task, AppState, Catalog, Config, OrderStore};

/// Main entry point for the market API server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Load the item catalog (fatal on failure)
/// 4. Apply the order schema
/// 5. Start background cache cleanup task
/// 6. Serve the router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "market_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Market API");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, database={}, catalog={}, catalog_cache_ttl={}s",
        config.server_port,
        config.database_path.display(),
        config.catalog_path.display(),
        config.catalog_cache_ttl
    );

    let catalog = Catalog::load(&config.catalog_path).with_context(|| {
        format!(
            "failed to load item catalog from {}",
            config.catalog_path.display()
        )
    })?;

    let schema = match fs::read_to_string(&config.schema_path) {
        Ok(sql) => sql,
        Err(err) => {
            warn!(
                "Could not read schema {} ({}), using built-in schema",
                config.schema_path.display(),
                err
            );
            DEFAULT_SCHEMA.to_string()
        }
    };
    let orders = OrderStore::open(&config.database_path);
    orders
        .init_schema(&schema)
        .context("failed to initialize order database")?;
    info!(
        "Order store ready with {} orders",
        orders.count().context("failed to count orders")?
    );

    let state = AppState::from_config(&config, catalog, orders);
    let cleanup_handle = spawn_cleanup_task(state.cache.clone(), config.cleanup_interval);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
