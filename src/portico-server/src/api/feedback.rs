//! Feedback submission endpoints.
//!
//! Every submission is a dual write: the record is enqueued on the local
//! durable log and independently forwarded upstream. Neither outcome
//! blocks or fails the other, and the client sees `{success: true}` once
//! the local append is enqueued. The local log is the ground truth if the
//! upstream never acknowledges.

use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

use super::types::{MessageFeedbackRequest, SessionFeedbackRequest, SuccessResponse};

/// Record thumbs up/down for a bot message.
pub async fn message_feedback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MessageFeedbackRequest>,
) -> AppResult<Json<SuccessResponse>> {
    let (Some(message_id), Some(feedback)) = (req.message_id, req.feedback) else {
        return Err(AppError::InvalidRequest(
            "Missing feedback fields".to_string(),
        ));
    };

    state.feedback_log.record_message(message_id, feedback);

    let upstream = state.upstream.clone();
    tokio::spawn(async move {
        let body = serde_json::json!({ "messageId": message_id, "feedback": feedback });
        if let Err(e) = upstream.post_json("/feedback/message", Some(&body)).await {
            warn!(message_id, error = %e, "Upstream message feedback forward failed");
        }
    });

    Ok(Json(SuccessResponse { success: true }))
}

/// Record a 1-5 session rating.
pub async fn session_feedback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionFeedbackRequest>,
) -> AppResult<Json<SuccessResponse>> {
    let rating = match req.rating {
        Some(rating @ 1..=5) => rating as u8,
        _ => return Err(AppError::InvalidRequest("Invalid rating".to_string())),
    };

    state.feedback_log.record_session(rating);

    let upstream = state.upstream.clone();
    tokio::spawn(async move {
        let body = serde_json::json!({ "rating": rating });
        if let Err(e) = upstream.post_json("/feedback/session", Some(&body)).await {
            warn!(rating, error = %e, "Upstream session feedback forward failed");
        }
    });

    Ok(Json(SuccessResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use portico_protocol::types::FeedbackValue;

    use super::*;
    use crate::config::{ServerConfig, UpstreamConfig};
    use crate::feedback_log::FeedbackSnapshot;

    fn state_for(upstream_url: &str, path: std::path::PathBuf) -> Arc<AppState> {
        let config = ServerConfig {
            upstream: UpstreamConfig {
                base_url: upstream_url.to_string(),
                ..Default::default()
            },
            feedback: crate::config::FeedbackConfig { path },
            ..Default::default()
        };
        Arc::new(AppState::new(config))
    }

    async fn read_snapshot(path: &std::path::Path) -> FeedbackSnapshot {
        let bytes = tokio::fs::read(path).await.expect("log file exists");
        serde_json::from_slice(&bytes).expect("log file is valid JSON")
    }

    #[tokio::test]
    async fn test_message_feedback_missing_fields_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for("http://127.0.0.1:1", dir.path().join("feedback.json"));

        let err = message_feedback(
            State(state),
            Json(MessageFeedbackRequest {
                message_id: Some(1),
                feedback: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_session_rating_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for("http://127.0.0.1:1", dir.path().join("feedback.json"));

        for rating in [0, 6] {
            let err = session_feedback(
                State(Arc::clone(&state)),
                Json(SessionFeedbackRequest {
                    rating: Some(rating),
                }),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, AppError::InvalidRequest(_)), "rating {rating}");
        }

        for rating in [1, 5] {
            let response = session_feedback(
                State(Arc::clone(&state)),
                Json(SessionFeedbackRequest {
                    rating: Some(rating),
                }),
            )
            .await
            .unwrap();
            assert!(response.0.success, "rating {rating}");
        }
    }

    #[tokio::test]
    async fn test_feedback_persists_locally_and_forwards_upstream() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/feedback/message"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_raw(r#"{"ok": true}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.json");
        let state = state_for(&server.uri(), path.clone());

        let response = message_feedback(
            State(Arc::clone(&state)),
            Json(MessageFeedbackRequest {
                message_id: Some(42),
                feedback: Some(FeedbackValue::Up),
            }),
        )
        .await
        .unwrap();
        assert!(response.0.success);

        state.feedback_log.flush().await;
        let snapshot = read_snapshot(&path).await;
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].message_id, 42);

        // The fire-and-forget forward runs on its own task; give it a beat.
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
    }

    #[tokio::test]
    async fn test_upstream_failure_does_not_fail_submission() {
        // No upstream at all: the forward fails, the ack does not.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.json");
        let state = state_for("http://127.0.0.1:1", path.clone());

        let response = message_feedback(
            State(Arc::clone(&state)),
            Json(MessageFeedbackRequest {
                message_id: Some(7),
                feedback: Some(FeedbackValue::Down),
            }),
        )
        .await
        .unwrap();
        assert!(response.0.success);

        state.feedback_log.flush().await;
        let snapshot = read_snapshot(&path).await;
        assert_eq!(snapshot.messages.len(), 1);
    }
}
