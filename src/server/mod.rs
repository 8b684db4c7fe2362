//! HTTP service exposing the feed and update-check entry points.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /feed`, `GET /api/rss` | [`handlers::feed`] |
//! | `GET /update`, `GET /api/update` | [`handlers::update`] |
//! | `GET /health` | [`handlers::health_check`] |

pub mod error;
pub mod handlers;

use axum::{Router, routing::get};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use handlers::AppState;

/// Build the router over shared `state`.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/feed", get(handlers::feed))
        .route("/api/rss", get(handlers::feed))
        .route("/update", get(handlers::update))
        .route("/api/update", get(handlers::update))
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Listen on `bind` until Ctrl-C.
pub async fn serve(bind: &str, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, create_router(Arc::new(state)))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Cannot listen for Ctrl-C; shutting down");
        return;
    }
    info!("Shutdown requested");
}
