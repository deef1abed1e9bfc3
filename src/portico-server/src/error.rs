//! Error types for the gateway.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Application error type.
///
/// Validation failures never reach the upstream service; upstream failures
/// carry the upstream status and body through to the client unchanged in
/// shape. Local persistence failures are absorbed inside the feedback
/// worker and never appear here.
#[derive(Debug, Error)]
pub enum AppError {
    /// Client input failed validation; no upstream call was made.
    #[error("{0}")]
    InvalidRequest(String),

    /// The upstream connection could not be established.
    #[error("Upstream service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The upstream service answered with a non-2xx status.
    #[error("Upstream returned {status}")]
    Upstream { status: u16, detail: String },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    ///
    /// Upstream statuses are mirrored; an unmappable status falls back
    /// to 500, as does a connection that never produced one.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body.
///
/// Flat `{error, detail?}` shape; existing clients parse the `error` field
/// directly, so no envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Self::InvalidRequest(message) => ErrorBody {
                error: message,
                detail: None,
            },
            Self::UpstreamUnavailable(detail) => ErrorBody {
                error: "Upstream request failed".to_string(),
                detail: Some(detail),
            },
            Self::Upstream { detail, .. } => ErrorBody {
                error: "Upstream error".to_string(),
                detail: Some(detail),
            },
            Self::Internal(message) => ErrorBody {
                error: "Internal Server Error".to_string(),
                detail: Some(message),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for the gateway.
pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Internal(error.to_string())
    }
}
