//! HTTP service exposing the probe engine.
//!
//! Provides three routes:
//! - `POST /probe` - run a probe from a JSON `ProbeRequest`
//! - `GET /download/{id}` - fetch a cached full body once
//! - `OPTIONS /probe` - CORS preflight
//!
//! The service owns the response cache and its sweeper task; the sweeper is
//! cancelled when the server shuts down.

mod handlers;
mod types;

use std::future::Future;
use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use log::info;
use tokio::net::TcpListener;

use crate::cache::ResponseCache;
use crate::config::ServerConfig;
use handlers::{cors_headers, download_handler, preflight_handler, probe_handler};
pub use types::{ErrorResponse, ServerState};

/// Builds the service router around shared state.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/probe", post(probe_handler).options(preflight_handler))
        .route(
            "/download/{id}",
            get(download_handler).options(preflight_handler),
        )
        .layer(middleware::from_fn(cors_headers))
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn start_server(config: ServerConfig) -> Result<(), anyhow::Error> {
    let address = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind probe server to {}: {}", address, e))?;

    serve(listener, &config, shutdown_signal()).await
}

/// Serves on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    config: &ServerConfig,
    shutdown: F,
) -> Result<(), anyhow::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let cache = Arc::new(ResponseCache::new(config.cache_ttl));
    let sweeper = cache.start_sweeper(config.sweep_interval);
    let app = router(ServerState { cache });

    let local = listener.local_addr()?;
    info!("Probe server listening on http://{}/", local);
    info!("  - Probe: POST http://{}/probe", local);
    info!("  - Download: GET http://{}/download/{{id}}", local);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!("Probe server error: {}", e));

    sweeper.cancel();
    info!("Probe server stopped");
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
