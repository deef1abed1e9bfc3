//! REST API routes and handlers.
//!
//! Non-streaming endpoints: health, the forward-and-relay group (ingest,
//! menu, history, search, suggestions), and the feedback pair. The chat
//! stream lives in [`crate::streaming`].

mod feedback;
mod forward;
mod health;
pub mod types;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub use types::HealthResponse;

/// Create the API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Forward-and-relay
        .route("/ingest", post(forward::ingest))
        .route("/menu", get(forward::menu))
        .route("/history/{session_id}", get(forward::history))
        .route("/search", get(forward::search))
        .route("/suggestions", post(forward::suggestions))
        // Feedback
        .route("/feedback/message", post(feedback::message_feedback))
        .route("/feedback/session", post(feedback::session_feedback))
}
