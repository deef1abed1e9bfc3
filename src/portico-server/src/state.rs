//! Application state management.

use std::time::{Duration, Instant};

use crate::config::ServerConfig;
use crate::feedback_log::FeedbackLog;
use crate::upstream::UpstreamClient;

/// Application state shared across request handlers.
///
/// The feedback log's queue is the only cross-request mutable state; each
/// chat request owns its upstream stream exclusively.
#[derive(Debug)]
pub struct AppState {
    /// Server configuration.
    pub config: ServerConfig,
    /// Upstream service client.
    pub upstream: UpstreamClient,
    /// Serialized durable feedback store.
    pub feedback_log: FeedbackLog,
    /// Start time.
    start_time: Instant,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ServerConfig) -> Self {
        let upstream = UpstreamClient::new(&config.upstream);
        let feedback_log = FeedbackLog::new(config.feedback.path.clone());

        Self {
            config,
            upstream,
            feedback_log,
            start_time: Instant::now(),
        }
    }

    /// Get uptime duration.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
