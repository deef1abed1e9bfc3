//! HTTP client for the Portico gateway.
//!
//! `send_chat` drives the whole lifecycle of one message send: user
//! message appended, bot placeholder created, stream consumed through the
//! shared frame grammar, completion flagged, and a best-effort suggestions
//! lookup issued on the final text. Chat failures surface to the user as
//! the fixed apology message, not as an error return; only the
//! non-chat helpers return errors for the caller to handle.

use futures::StreamExt;
use portico_protocol::types::{
    ChatRequest, FeedbackValue, HistoryTurn, SuggestionsRequest, SuggestionsResponse,
};
use thiserror::Error;
use tracing::warn;

use crate::consumer::{Conversation, MessageAssembler, StreamPhase};
use crate::session::SessionContext;

/// Client error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-2xx status.
    #[error("Gateway returned {status}: {detail}")]
    Gateway { status: u16, detail: String },
}

/// Client for the Portico gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
    /// Retrieval depth forwarded with every chat request.
    k: u32,
}

impl GatewayClient {
    /// Create a new client for the given gateway base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            k: 3,
        }
    }

    /// Override the retrieval depth.
    pub fn with_k(mut self, k: u32) -> Self {
        self.k = k.max(1);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Send one chat message and stream the answer into the conversation.
    ///
    /// An empty query is ignored. Whatever happens on the wire, the
    /// conversation ends up with a complete bot message: streamed text on
    /// success, the apology on failure.
    pub async fn send_chat(
        &self,
        conversation: &mut Conversation,
        session: &SessionContext,
        query: &str,
    ) -> Result<(), ClientError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        conversation.push_user(query);
        let mut assembler = MessageAssembler::new(conversation.next_id());

        let request = ChatRequest {
            query: query.to_string(),
            k: self.k,
            session_id: session.id().to_string(),
        };

        match self.open_chat_stream(&request).await {
            Ok(response) => {
                let mut chunks = response.bytes_stream();
                while let Some(next) = chunks.next().await {
                    match next {
                        Ok(raw) => {
                            let text = String::from_utf8_lossy(&raw);
                            assembler.push_chunk(&text);
                            if assembler.phase() == StreamPhase::Errored {
                                // Stop consuming; the rest of the stream
                                // is discarded.
                                break;
                            }
                        }
                        Err(e) => {
                            // A truncated stream is indistinguishable from
                            // a clean end; keep the partial text.
                            warn!(error = %e, "Chat stream broke mid-flight");
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                assembler.push_chunk("error");
            }
        }

        assembler.finish();
        let errored = assembler.phase() == StreamPhase::Errored;
        let final_text = assembler.message().text.clone();
        conversation.push_message(assembler.into_message());

        // Best-effort follow-up suggestions on the completed answer.
        if errored {
            conversation.set_suggestions(Vec::new());
        } else {
            match self.suggestions(&final_text).await {
                Ok(suggestions) => conversation.set_suggestions(suggestions),
                Err(e) => {
                    warn!(error = %e, "Suggestions lookup failed");
                    conversation.set_suggestions(Vec::new());
                }
            }
        }

        Ok(())
    }

    async fn open_chat_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<reqwest::Response, ClientError> {
        let response = self
            .client
            .post(self.url("/chat"))
            .json(request)
            .send()
            .await?;
        Self::ensure_success(response).await
    }

    /// Fetch prior turns for a session.
    pub async fn history(
        &self,
        session: &SessionContext,
    ) -> Result<Vec<HistoryTurn>, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/history/{}", session.id())))
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Fetch follow-up suggestions for the given answer text.
    pub async fn suggestions(&self, text: &str) -> Result<Vec<String>, ClientError> {
        let response = self
            .client
            .post(self.url("/suggestions"))
            .json(&SuggestionsRequest {
                text: text.to_string(),
            })
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        let body: SuggestionsResponse = response.json().await?;
        Ok(body.suggestions)
    }

    /// Submit thumbs up/down for a message.
    pub async fn send_message_feedback(
        &self,
        message_id: u64,
        feedback: FeedbackValue,
    ) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url("/feedback/message"))
            .json(&serde_json::json!({ "messageId": message_id, "feedback": feedback }))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Submit a 1-5 session rating.
    pub async fn send_session_feedback(&self, rating: u8) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url("/feedback/session"))
            .json(&serde_json::json!({ "rating": rating }))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let detail = response.text().await.unwrap_or_default();
        Err(ClientError::Gateway { status, detail })
    }
}

#[cfg(test)]
mod tests {
    use crate::consumer::{ERROR_APOLOGY, Sender};

    use super::*;

    async fn mock_suggestions(server: &wiremock::MockServer, suggestions: &[&str]) {
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/suggestions"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_raw(
                serde_json::json!({ "suggestions": suggestions }).to_string(),
                "application/json",
            ))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_send_chat_appends_user_and_bot_messages() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/chat"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string("The special today is soup"),
            )
            .mount(&server)
            .await;
        mock_suggestions(&server, &["What sides come with it?"]).await;

        let client = GatewayClient::new(server.uri());
        let session = SessionContext::new();
        let mut conversation = Conversation::empty();

        client
            .send_chat(&mut conversation, &session, "What's today's special?")
            .await
            .unwrap();

        let messages = conversation.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert!(messages[0].is_complete);
        assert_eq!(messages[1].sender, Sender::Bot);
        assert_eq!(messages[1].text, "The special today is soup");
        assert!(messages[1].is_complete);
        assert_eq!(conversation.suggestions(), ["What sides come with it?"]);
    }

    #[tokio::test]
    async fn test_send_chat_adopts_streamed_message_id() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/chat"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("Message ID: 42"))
            .mount(&server)
            .await;
        mock_suggestions(&server, &[]).await;

        let client = GatewayClient::new(server.uri());
        let session = SessionContext::new();
        let mut conversation = Conversation::empty();

        client
            .send_chat(&mut conversation, &session, "hello")
            .await
            .unwrap();

        let bot = &conversation.messages()[1];
        assert_eq!(bot.id, 42);
        assert_eq!(bot.text, "");
        assert!(bot.is_complete);
    }

    #[tokio::test]
    async fn test_gateway_failure_renders_apology_message() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/chat"))
            .respond_with(
                wiremock::ResponseTemplate::new(500)
                    .set_body_string(r#"{"error": "Upstream request failed"}"#),
            )
            .mount(&server)
            .await;

        let client = GatewayClient::new(server.uri());
        let session = SessionContext::new();
        let mut conversation = Conversation::empty();

        client
            .send_chat(&mut conversation, &session, "hello")
            .await
            .unwrap();

        let bot = &conversation.messages()[1];
        assert!(bot.text.ends_with(ERROR_APOLOGY));
        assert!(bot.is_complete);
        assert!(conversation.suggestions().is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_sends_nothing() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/chat"))
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = GatewayClient::new(server.uri());
        let session = SessionContext::new();
        let mut conversation = Conversation::empty();

        client
            .send_chat(&mut conversation, &session, "   ")
            .await
            .unwrap();
        assert!(conversation.messages().is_empty());

        server.verify().await;
    }

    #[tokio::test]
    async fn test_suggestions_failure_clears_suggestions() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/chat"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("answer"))
            .mount(&server)
            .await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/suggestions"))
            .respond_with(wiremock::ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = GatewayClient::new(server.uri());
        let session = SessionContext::new();
        let mut conversation = Conversation::empty();
        conversation.set_suggestions(vec!["stale".to_string()]);

        client
            .send_chat(&mut conversation, &session, "hello")
            .await
            .unwrap();

        assert_eq!(conversation.messages()[1].text, "answer");
        assert!(conversation.suggestions().is_empty());
    }

    #[tokio::test]
    async fn test_history_forwards_session_id() {
        let server = wiremock::MockServer::start().await;
        let session = SessionContext::new();
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(format!(
                "/history/{}",
                session.id()
            )))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_raw(
                r#"[{"role": "user", "content": "hi", "timestamp": null}]"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let client = GatewayClient::new(server.uri());
        let turns = client.history(&session).await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, "user");
    }

    #[tokio::test]
    async fn test_feedback_posts_succeed() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/feedback/message"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_raw(r#"{"success": true}"#, "application/json"),
            )
            .mount(&server)
            .await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/feedback/session"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_raw(r#"{"success": true}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let client = GatewayClient::new(server.uri());
        client
            .send_message_feedback(42, FeedbackValue::Up)
            .await
            .unwrap();
        client.send_session_feedback(5).await.unwrap();
    }
}
