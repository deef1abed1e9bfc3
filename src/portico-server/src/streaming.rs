//! Streaming chat relay.
//!
//! `POST /chat` proxies the request to the upstream service and relays its
//! answer as a `text/plain` chunked stream. Chunks pass through the shared
//! frame grammar: content is forwarded the moment it is classified (the
//! first byte reaches the client before the answer finishes), `Message ID:`
//! control frames are re-serialized verbatim for the client to interpret,
//! and the error sentinel ends the response with the remainder of the
//! upstream stream discarded.
//!
//! If the upstream stream breaks after content has been sent, the response
//! simply ends at the break: partial content is not retracted and no
//! terminal marker distinguishes truncation from a clean end. When the
//! client disconnects, axum drops the body stream, which drops the upstream
//! response and releases the connection.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use portico_protocol::frame::{FrameDecoder, StreamFrame};
use portico_protocol::types::ChatRequest;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Create streaming routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

/// Relay a chat request and stream the upstream answer back.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> AppResult<Response> {
    if req.query.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Missing query parameter".to_string(),
        ));
    }

    let upstream = state
        .upstream
        .open_chat_stream(&req.query, req.effective_k(), &req.session_id)
        .await?;

    debug!(session_id = %req.session_id, "Relaying chat stream");

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        relay_body(upstream.bytes_stream()),
    )
        .into_response())
}

/// Build the response body by piping upstream chunks through the frame
/// grammar. Frames are forwarded in arrival order with no buffering beyond
/// the chunk in hand.
fn relay_body<S, E>(chunks: S) -> Body
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut chunks = std::pin::pin!(chunks);
        let mut decoder = FrameDecoder::new();

        while let Some(next) = chunks.next().await {
            let raw = match next {
                Ok(raw) => raw,
                Err(e) => {
                    // Mid-flight break: end where we are, keep what was sent.
                    warn!(error = %e, "Upstream stream broke mid-flight");
                    break;
                }
            };

            let text = String::from_utf8_lossy(&raw);
            match decoder.push_chunk(&text) {
                Some(StreamFrame::Content(content)) => {
                    yield Ok::<Bytes, Infallible>(Bytes::from(content));
                }
                Some(StreamFrame::ControlMessageId(id)) => {
                    // Pure pass-through at the wire level: the client owns
                    // the interpretation of the id.
                    yield Ok(Bytes::from(format!("Message ID: {id}")));
                }
                Some(StreamFrame::ErrorSentinel) => break,
                None => {}
            }
        }
    };

    Body::from_stream(stream)
}
