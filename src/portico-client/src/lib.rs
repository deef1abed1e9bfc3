//! Portico Client - talks to the gateway and reconstructs messages from
//! the relayed chat stream.
//!
//! The stream arrives as plain text with in-band tokens; the consumer
//! applies the same frame grammar as the gateway (shared through
//! `portico-protocol`) to keep message text and message identity straight
//! while chunks are still arriving.

pub mod client;
pub mod consumer;
pub mod session;

pub use client::{ClientError, GatewayClient};
pub use consumer::{ChatMessage, Conversation, ERROR_APOLOGY, MessageAssembler, Sender, StreamPhase};
pub use session::SessionContext;
