//! Lifecycle events for sessions and cursor state
//!
//! Events are published on a broadcast channel by the registry and cursor
//! guard. Publishing is best-effort: lagging or absent subscribers never
//! block an operation.

use serde::{Deserialize, Serialize};

use crate::session::types::SessionId;
use crate::user::UserId;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Ended by an explicit end call (single or batch)
    Explicit,
    /// Replaced by a new session of the same type
    Replaced,
    /// The scope the session was bound to was cancelled
    ScopeEnded,
    /// The user disconnected
    Disconnected,
}

/// Events emitted by the UI coordination layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// A session was registered for a user
    SessionStarted {
        user: UserId,
        session: SessionId,
        kind: String,
    },

    /// A session was removed and torn down
    SessionEnded {
        user: UserId,
        session: SessionId,
        kind: String,
        reason: EndReason,
    },

    /// The user's effective cursor flag flipped
    ///
    /// Emitted only on transitions, not on every guard mutation.
    CursorChanged { user: UserId, enabled: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ui_event_json_format() {
        let event = UiEvent::CursorChanged {
            user: UserId::new(),
            enabled: true,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "cursor_changed");
        assert_eq!(json["enabled"], true);
    }

    #[test]
    fn session_started_json_format() {
        let event = UiEvent::SessionStarted {
            user: UserId::new(),
            session: SessionId::new(),
            kind: "menu".to_string(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "session_started");
        assert_eq!(json["kind"], "menu");
    }

    #[test]
    fn end_reason_json_format() {
        assert_eq!(
            serde_json::to_string(&EndReason::Explicit).unwrap(),
            "\"explicit\""
        );
        assert_eq!(
            serde_json::to_string(&EndReason::Replaced).unwrap(),
            "\"replaced\""
        );
        assert_eq!(
            serde_json::to_string(&EndReason::ScopeEnded).unwrap(),
            "\"scope_ended\""
        );
        assert_eq!(
            serde_json::to_string(&EndReason::Disconnected).unwrap(),
            "\"disconnected\""
        );
    }

    #[test]
    fn ui_event_serialization_roundtrip() {
        let event = UiEvent::SessionEnded {
            user: UserId::new(),
            session: SessionId::new(),
            kind: "hud".to_string(),
            reason: EndReason::ScopeEnded,
        };

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: UiEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }
}
