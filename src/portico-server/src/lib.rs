//! Portico - chat-session gateway.
//!
//! Sits between browser clients and the upstream inference/retrieval
//! service and provides:
//! - a streaming chat relay with in-band control-frame extraction
//! - a serialized, locally durable feedback log with best-effort upstream
//!   forwarding
//! - forward-and-relay endpoints for ingest, menu, history, search, and
//!   suggestions
//! - health checks
//!
//! The upstream service owns all NLP and retrieval logic; the gateway owns
//! ordering, durability, and the separation of control from content bytes.

pub mod api;
pub mod config;
pub mod error;
pub mod feedback_log;
pub mod state;
pub mod streaming;
pub mod upstream;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::HeaderValue;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use config::ServerConfig;
pub use error::{AppError, AppResult};
pub use state::AppState;

/// Run the gateway with the given configuration.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    run_with_shutdown(config, std::future::pending()).await
}

/// Run the gateway with graceful shutdown support.
pub async fn run_with_shutdown<F>(config: ServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let state = Arc::new(AppState::new(config.clone()));
    let state_for_cleanup = Arc::clone(&state);
    let app = create_router_with_state(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Starting Portico gateway on {}", addr);
    info!("Upstream service: {}", config.upstream.base_url);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    // Drain any feedback writes still queued before the process exits.
    info!("Gateway shutting down, flushing feedback log...");
    let drain = state_for_cleanup.feedback_log.flush();
    if tokio::time::timeout(Duration::from_secs(config.shutdown_timeout), drain)
        .await
        .is_err()
    {
        warn!("Timed out waiting for the feedback log to drain");
    }

    Ok(())
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    create_router_with_state(Arc::new(state))
}

/// Create the application router with an Arc-wrapped state.
///
/// This variant is useful when you need to keep a reference to the state
/// for cleanup purposes (e.g., during graceful shutdown).
pub fn create_router_with_state(state: Arc<AppState>) -> Router {
    let routes = api::routes().merge(streaming::routes());
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .merge(routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// An empty origin list means any origin is allowed.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
