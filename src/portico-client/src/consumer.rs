//! Incremental stream consumer.
//!
//! Reconstructs a chat message from the relayed stream one chunk at a
//! time: content accumulates on a placeholder bot message, a `Message ID:`
//! control frame updates the placeholder's identity without touching its
//! text, and the error sentinel replaces further streaming with a fixed
//! apology. Once a message is complete its text is frozen.

use chrono::{DateTime, Utc};
use portico_protocol::frame::{FrameDecoder, StreamFrame};

/// Fixed user-facing text shown when a chat stream errors.
pub const ERROR_APOLOGY: &str =
    "I apologize, but I encountered an error. Please try again or contact support.";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// One message in the visible conversation.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub is_complete: bool,
}

impl ChatMessage {
    /// A user message is complete the moment it is created.
    pub fn user(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            is_complete: true,
        }
    }

    fn bot_placeholder(id: u64) -> Self {
        Self {
            id,
            text: String::new(),
            sender: Sender::Bot,
            timestamp: Utc::now(),
            is_complete: false,
        }
    }
}

/// Lifecycle of one outstanding message send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    Idle,
    Sending,
    Streaming,
    Complete,
    Errored,
}

/// Builds the bot message for a single send as chunks arrive.
#[derive(Debug)]
pub struct MessageAssembler {
    message: ChatMessage,
    phase: StreamPhase,
    decoder: FrameDecoder,
}

impl MessageAssembler {
    /// Create the placeholder for an in-flight send. The provisional id is
    /// replaced if the stream carries a control frame.
    pub fn new(provisional_id: u64) -> Self {
        Self {
            message: ChatMessage::bot_placeholder(provisional_id),
            phase: StreamPhase::Sending,
            decoder: FrameDecoder::new(),
        }
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    pub fn message(&self) -> &ChatMessage {
        &self.message
    }

    /// Feed the next decoded chunk. Chunks after completion or error are
    /// ignored.
    pub fn push_chunk(&mut self, chunk: &str) {
        if matches!(self.phase, StreamPhase::Complete | StreamPhase::Errored) {
            return;
        }
        self.phase = StreamPhase::Streaming;

        match self.decoder.push_chunk(chunk) {
            Some(StreamFrame::Content(text)) => {
                self.message.text.push_str(&text);
                // Display normalization only; what was sent upstream is
                // untouched.
                self.message.text = collapse_whitespace(&self.message.text);
            }
            Some(StreamFrame::ControlMessageId(id)) => {
                self.message.id = id;
            }
            Some(StreamFrame::ErrorSentinel) => {
                if !self.message.text.is_empty() && !self.message.text.ends_with(' ') {
                    self.message.text.push(' ');
                }
                self.message.text.push_str(ERROR_APOLOGY);
                self.message.is_complete = true;
                self.phase = StreamPhase::Errored;
            }
            None => {}
        }
    }

    /// End-of-stream: flip `is_complete` exactly once. An errored send is
    /// already final and stays errored.
    pub fn finish(&mut self) {
        if self.phase != StreamPhase::Errored {
            self.message.is_complete = true;
            self.phase = StreamPhase::Complete;
        }
    }

    pub fn into_message(self) -> ChatMessage {
        self.message
    }
}

/// The visible message list for one session, plus the current follow-up
/// suggestions. Messages are owned here and never shared across sessions.
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    suggestions: Vec<String>,
}

impl Conversation {
    /// Start a conversation seeded with the assistant greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage {
                id: 1,
                text: "Hello! I'm your AI assistant. How can I help you today?".to_string(),
                sender: Sender::Bot,
                timestamp: Utc::now(),
                is_complete: true,
            }],
            suggestions: Vec::new(),
        }
    }

    /// Start with no seeded greeting.
    pub fn empty() -> Self {
        Self {
            messages: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Append the user's message; it is complete immediately.
    pub fn push_user(&mut self, text: impl Into<String>) -> u64 {
        let id = self.next_id();
        self.messages.push(ChatMessage::user(id, text));
        id
    }

    /// Append a finished (or errored) bot message.
    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Provisional id for the next message.
    pub fn next_id(&self) -> u64 {
        self.messages.len() as u64 + 1
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn set_suggestions(&mut self, suggestions: Vec<String>) {
        self.suggestions = suggestions;
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse every run of consecutive whitespace to a single space.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}
