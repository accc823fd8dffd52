//! HTTP API server over a shared label store.
//!
//! The store itself has no internal synchronization; the server wraps it in
//! an `RwLock` so an add (vector insert plus label append) is never
//! interleaved with another add or with a search.

pub mod routes;

use crate::config::Config;
use crate::error::Result;
use crate::metrics::MetricsCollector;
use crate::store::VectorLabelStore;
use std::sync::{Arc, RwLock};

/// Shared application state for the HTTP server.
pub struct AppState {
    pub store: RwLock<VectorLabelStore>,
    pub metrics: RwLock<MetricsCollector>,
    pub default_top_k: usize,
}

impl AppState {
    pub fn new(dimension: usize, default_top_k: usize) -> Result<Self> {
        Ok(Self {
            store: RwLock::new(VectorLabelStore::new(dimension)?),
            metrics: RwLock::new(MetricsCollector::new()),
            default_top_k,
        })
    }
}

/// Start the HTTP server and run until Ctrl-C.
pub async fn start(config: &Config) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(
        config.store.dimension,
        config.store.default_top_k,
    )?);

    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.addr).await?;
    tracing::info!(
        addr = %config.server.addr,
        dimension = config.store.dimension,
        "server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
