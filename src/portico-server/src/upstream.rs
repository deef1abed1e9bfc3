//! HTTP client for the upstream inference/retrieval service.
//!
//! The upstream service is opaque to the gateway: it owns all NLP and
//! retrieval logic, and this client only distinguishes "could not connect"
//! from "answered with a non-2xx", mapping both onto [`AppError`] so the
//! handlers can propagate status and detail unchanged.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::config::UpstreamConfig;
use crate::error::{AppError, AppResult};

/// Client for the upstream service.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl UpstreamClient {
    /// Create a new upstream client from configuration.
    pub fn new(config: &UpstreamConfig) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout_duration())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.base_url.clone(),
            request_timeout: config.request_timeout_duration(),
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Open the streaming chat request.
    ///
    /// Returns the raw response so the relay can consume its byte stream
    /// incrementally. No overall timeout is applied: answers stream for as
    /// long as the upstream keeps producing.
    pub async fn open_chat_stream(
        &self,
        query: &str,
        k: u32,
        session_id: &str,
    ) -> AppResult<reqwest::Response> {
        let url = self.url("/chat");
        debug!(%url, k, "Opening upstream chat stream");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "query": query,
                "k": k,
                "sessionId": session_id,
            }))
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(e.to_string()))?;

        Self::ensure_success(response).await
    }

    /// Forward a GET request and relay the upstream JSON.
    pub async fn get_json(&self, path: &str, query: &[(&str, String)]) -> AppResult<Value> {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(e.to_string()))?;

        let response = Self::ensure_success(response).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::Upstream {
                status: 502,
                detail: format!("Invalid upstream JSON: {e}"),
            })
    }

    /// Forward a POST request and relay the upstream JSON.
    pub async fn post_json(&self, path: &str, body: Option<&Value>) -> AppResult<Value> {
        let mut request = self.client.post(self.url(path)).timeout(self.request_timeout);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(e.to_string()))?;

        let response = Self::ensure_success(response).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::Upstream {
                status: 502,
                detail: format!("Invalid upstream JSON: {e}"),
            })
    }

    /// Probe the upstream health endpoint.
    pub async fn probe_health(&self) -> bool {
        match self
            .client
            .get(self.url("/health"))
            .timeout(Duration::from_secs(3))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Map a non-2xx response to an error carrying the upstream status and
    /// body text as the detail.
    async fn ensure_success(response: reqwest::Response) -> AppResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let detail = response.text().await.unwrap_or_default();
        Err(AppError::Upstream { status, detail })
    }
}
