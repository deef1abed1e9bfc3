//! API request and response types.

use portico_protocol::types::FeedbackValue;
use serde::{Deserialize, Serialize};

// ============================================================================
// Health
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Result of probing the upstream health endpoint.
    pub upstream: String,
    /// Current epoch milliseconds.
    pub time: i64,
    /// Gateway uptime in seconds.
    pub uptime_seconds: u64,
}

// ============================================================================
// Feedback
// ============================================================================

/// Message feedback submission.
///
/// Fields are optional so a missing field maps to the wire-level 400
/// instead of a body-rejection status.
#[derive(Debug, Deserialize)]
pub struct MessageFeedbackRequest {
    #[serde(rename = "messageId")]
    pub message_id: Option<u64>,
    pub feedback: Option<FeedbackValue>,
}

/// Session rating submission.
#[derive(Debug, Deserialize)]
pub struct SessionFeedbackRequest {
    pub rating: Option<i64>,
}

/// Unconditional feedback acknowledgment.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// ============================================================================
// Search
// ============================================================================

/// Query parameters for the search forward.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}
