//! Server configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Upstream inference/retrieval service.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Local feedback log.
    #[serde(default)]
    pub feedback: FeedbackConfig,

    /// CORS origins (empty = allow all).
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            upstream: UpstreamConfig::default(),
            feedback: FeedbackConfig::default(),
            cors_origins: vec![],
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("PORTICO_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Ok(url) = std::env::var("PORTICO_UPSTREAM_URL") {
            config.upstream.base_url = url;
        }

        if let Ok(path) = std::env::var("PORTICO_FEEDBACK_PATH") {
            config.feedback.path = PathBuf::from(path);
        }

        Ok(config)
    }
}

/// Upstream service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the upstream service.
    #[serde(default = "default_upstream_url")]
    pub base_url: String,

    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Request timeout in seconds for non-streaming forwards.
    /// The chat stream is exempt: answers can legitimately take longer
    /// than any fixed request budget.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

fn default_upstream_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_url(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl UpstreamConfig {
    /// Get the connect timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Get the request timeout as a Duration.
    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Feedback log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Path of the persisted feedback document.
    #[serde(default = "default_feedback_path")]
    pub path: PathBuf,
}

fn default_feedback_path() -> PathBuf {
    PathBuf::from("feedback.json")
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            path: default_feedback_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:3000");
        assert_eq!(config.upstream.base_url, "http://localhost:8000");
        assert_eq!(config.feedback.path, PathBuf::from("feedback.json"));
    }

    #[test]
    fn test_config_serialization() {
        let config = ServerConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.listen_addr, parsed.listen_addr);
        assert_eq!(config.upstream.base_url, parsed.upstream.base_url);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: ServerConfig =
            serde_json::from_str(r#"{"listen_addr": "127.0.0.1:9999"}"#).unwrap();
        assert_eq!(parsed.listen_addr, "127.0.0.1:9999");
        assert_eq!(parsed.upstream.connect_timeout, 5);
    }
}
