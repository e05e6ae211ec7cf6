//! JSON HTTP API over the clip catalog.

pub mod http;

use std::future::Future;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::errors::Result;
use crate::storage::ClipStorage;
use crate::storage::memory::MemoryStorage;

/// Shared application state
pub struct AppState {
    pub storage: Arc<dyn ClipStorage + Send + Sync>,
}

impl AppState {
    pub fn new(storage: Arc<dyn ClipStorage + Send + Sync>) -> Self {
        Self { storage }
    }
}

impl Default for AppState {
    /// State backed by a freshly seeded in-memory catalog.
    fn default() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/shorts",
            get(http::list_shorts)
                .post(http::add_short)
                .fallback(http::method_not_allowed),
        )
        .route("/api/stats", get(http::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("shortflix listening on {}", listener.local_addr()?);
    serve_on(listener, state, shutdown_signal()).await?;
    tracing::info!("shortflix stopped");
    Ok(())
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_on<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received Ctrl-C, shutting down"),
        Err(e) => {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
