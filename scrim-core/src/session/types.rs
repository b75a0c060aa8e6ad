//! Session type definitions

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a session instance
///
/// Distinguishes a session from its replacement in the same slot, so a
/// scope bound to a replaced session can never end its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new session ID using UUID v7 (time-ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Options supplied when starting a session
///
/// Passed through to the session factory. `hold_cursor` is also interpreted
/// by the registry itself: while the session is live, a cursor guard is
/// asserted on the owning user and released on any end path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Keep a cursor guard asserted for the session's lifetime
    #[serde(default)]
    pub hold_cursor: bool,

    /// Opaque parameters interpreted by the session factory
    ///
    /// The factory may reject these with a `ConstructionError`.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl SessionOptions {
    /// Create options with a cursor hold for the session's lifetime.
    #[must_use]
    pub fn with_hold_cursor(mut self, hold_cursor: bool) -> Self {
        self.hold_cursor = hold_cursor;
        self
    }

    /// Create options with factory parameters.
    #[must_use]
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }
}
