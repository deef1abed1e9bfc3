//! Health check endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::Utc;

use crate::state::AppState;

use super::types::HealthResponse;

/// Health check endpoint. The gateway itself is healthy whenever it can
/// answer; the upstream field reports the probe result separately.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let upstream = if state.upstream.probe_health().await {
        "ok"
    } else {
        "unreachable"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        upstream: upstream.to_string(),
        time: Utc::now().timestamp_millis(),
        uptime_seconds: state.uptime().as_secs(),
    })
}
