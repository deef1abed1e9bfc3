//! Stream-frame grammar for the chat answer stream.
//!
//! The upstream service interleaves displayable text with two in-band
//! tokens, and classification happens per decoded chunk. The grammar is
//! deliberately kept in one place: the gateway relay and the client
//! consumer both go through [`FrameDecoder`] instead of scattering
//! substring checks at each edge.

use std::sync::LazyLock;

use regex::Regex;

/// A control frame is a whole chunk of the form `Message ID: <digits>`,
/// case-insensitive on the label, tolerating surrounding whitespace.
static MESSAGE_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*message id:\s*(\d+)\s*$").expect("Invalid message id regex")
});

/// One classified element of the chat answer stream.
///
/// Frames are produced in chunk-arrival order and consumed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// Displayable answer text, forwarded unchanged.
    Content(String),
    /// The message identifier assigned by the upstream service.
    ControlMessageId(u64),
    /// Terminal error marker; nothing after it is consumed.
    ErrorSentinel,
}

/// Classify a single decoded chunk.
///
/// Returns `None` for empty or whitespace-only chunks, which produce no
/// frame at all. A chunk whose id digits overflow `u64` is not a valid
/// control frame and falls through to the content rules.
pub fn classify_chunk(chunk: &str) -> Option<StreamFrame> {
    if chunk.trim().is_empty() {
        return None;
    }

    if let Some(caps) = MESSAGE_ID_REGEX.captures(chunk)
        && let Ok(id) = caps[1].parse::<u64>()
    {
        return Some(StreamFrame::ControlMessageId(id));
    }

    if chunk.to_lowercase().contains("error") {
        return Some(StreamFrame::ErrorSentinel);
    }

    Some(StreamFrame::Content(chunk.to_string()))
}

/// Stateful chunk classifier enforcing the stop-after-sentinel rule.
///
/// After the sentinel has been emitted every later chunk is ignored, which
/// is what lets callers discard the remainder of a broken upstream stream
/// without special-casing.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    terminated: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk in arrival order.
    pub fn push_chunk(&mut self, chunk: &str) -> Option<StreamFrame> {
        if self.terminated {
            return None;
        }
        let frame = classify_chunk(chunk);
        if matches!(frame, Some(StreamFrame::ErrorSentinel)) {
            self.terminated = true;
        }
        frame
    }

    /// True once the error sentinel has been seen.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}
