//! Explicit session identity.
//!
//! The session id is client-generated and opaque to the gateway; it exists
//! to correlate a request stream with upstream conversation state and
//! history lookups. It is an explicit value passed into every call rather
//! than ambient storage, so its lifecycle (create on first use, discard on
//! end) is a visible state transition.

use uuid::Uuid;

/// Identity of one chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    id: String,
}

impl SessionContext {
    /// Create a fresh session identity.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
        }
    }

    /// The opaque session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// End the session. Consuming the context is what discards the id;
    /// the next conversation starts from [`SessionContext::new`].
    pub fn end(self) {}
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
