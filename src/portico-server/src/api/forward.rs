//! Forward-and-relay endpoints.
//!
//! Request in, upstream JSON out, with status and detail propagation
//! identical in shape to the chat failure case. No local caching: a
//! history miss or upstream failure surfaces as the upstream error and the
//! client decides how to degrade.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use portico_protocol::types::SuggestionsRequest;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

use super::types::SearchQuery;

/// Trigger an upstream ingest run.
pub async fn ingest(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    state.upstream.post_json("/ingest", None).await.map(Json)
}

/// Fetch the upstream menu.
pub async fn menu(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    state.upstream.get_json("/menu", &[]).await.map(Json)
}

/// Fetch prior turns for a session. The id is opaque to the gateway; it is
/// threaded through untouched.
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> AppResult<Json<Value>> {
    state
        .upstream
        .get_json(&format!("/history/{session_id}"), &[])
        .await
        .map(Json)
}

/// Forward a search query.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Value>> {
    let q = match query.q {
        Some(q) if !q.trim().is_empty() => q,
        _ => {
            return Err(AppError::InvalidRequest(
                "Missing q parameter".to_string(),
            ));
        }
    };

    let mut params = vec![("q", q)];
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }

    state.upstream.get_json("/search", &params).await.map(Json)
}

/// Forward a suggestions lookup.
pub async fn suggestions(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SuggestionsRequest>,
) -> AppResult<Json<Value>> {
    state
        .upstream
        .post_json("/suggestions", Some(&serde_json::json!({ "text": req.text })))
        .await
        .map(Json)
}
