//! Portico Protocol - types shared between the gateway and its clients.
//!
//! The chat answer travels as a plain-text chunk stream with two in-band
//! tokens: a `Message ID: <n>` control frame carrying the assigned message
//! identifier, and an error sentinel (any chunk containing `error`) that
//! terminates the stream. Both the gateway relay and the client consumer
//! classify chunks through the same [`frame`] grammar so the two edges can
//! never drift apart.

pub mod frame;
pub mod types;

pub use frame::{FrameDecoder, StreamFrame, classify_chunk};
pub use types::{
    ChatRequest, FeedbackValue, HistoryTurn, MessageFeedback, SessionFeedback, SuggestionsRequest,
    SuggestionsResponse,
};
