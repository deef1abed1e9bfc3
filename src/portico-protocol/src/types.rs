//! Request, response, and feedback record types.
//!
//! Field names follow the wire protocol (camelCase `sessionId`,
//! `messageId`), so these types serialize exactly what existing clients
//! and the upstream service expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_k() -> u32 {
    3
}

/// A chat request as submitted by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's question. Must be non-empty after trimming.
    pub query: String,
    /// Number of retrieval results the upstream service should consider.
    #[serde(default = "default_k")]
    pub k: u32,
    /// Opaque client-generated session identifier.
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

impl ChatRequest {
    /// Effective `k`: the invariant is `k >= 1`, enforced by clamping
    /// rather than rejection (the original gateway defaulted silently).
    pub fn effective_k(&self) -> u32 {
        self.k.max(1)
    }
}

/// Thumbs up/down on a single bot message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackValue {
    Up,
    Down,
}

/// A recorded piece of message-level feedback. Append-only once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageFeedback {
    #[serde(rename = "messageId")]
    pub message_id: u64,
    pub feedback: FeedbackValue,
    pub timestamp: DateTime<Utc>,
}

/// A recorded session rating (1..=5). Append-only once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFeedback {
    pub rating: u8,
    pub timestamp: DateTime<Utc>,
}

/// One prior turn returned by the history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: String,
    pub content: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Body of a suggestions lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsRequest {
    pub text: String,
}

/// Suggested follow-up questions for the last answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    #[serde(default)]
    pub suggestions: Vec<String>,
}
