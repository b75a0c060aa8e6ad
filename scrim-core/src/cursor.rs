//! Cursor guard arbitration
//!
//! Multiple independent callers may each want the cursor visible for one
//! user at the same time. Each caller asserts its own guard id; the
//! effective flag is the logical OR over the user's guard set, so one
//! feature releasing its guard never stomps on another's.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};

use crate::events::UiEvent;
use crate::user::UserId;

/// Per-user cursor guard sets
///
/// Set semantics make repeated identical calls idempotent: asserting the
/// same id twice is one assertion, and releasing an absent id is a no-op.
#[derive(Clone)]
pub struct CursorGuards {
    /// Guard ids per user; empty sets are removed eagerly, so presence
    /// implies enabled.
    holds: Arc<RwLock<HashMap<UserId, HashSet<String>>>>,
    /// Lifecycle event channel
    events: broadcast::Sender<UiEvent>,
}

impl CursorGuards {
    /// Create a new guard store publishing on the given event channel
    pub fn new(events: broadcast::Sender<UiEvent>) -> Self {
        Self {
            holds: Arc::new(RwLock::new(HashMap::new())),
            events,
        }
    }

    /// Whether the cursor is effectively enabled for a user
    pub async fn is_cursor_enabled(&self, user: UserId) -> bool {
        self.holds.read().await.contains_key(&user)
    }

    /// Assert or release one caller's guard id for a user
    ///
    /// Emits [`UiEvent::CursorChanged`] only when the effective flag flips.
    pub async fn set_cursor(&self, user: UserId, id: &str, enabled: bool) {
        let flipped = {
            let mut holds = self.holds.write().await;
            if enabled {
                let guards = holds.entry(user).or_default();
                let was_empty = guards.is_empty();
                guards.insert(id.to_string());
                was_empty
            } else {
                match holds.get_mut(&user) {
                    Some(guards) => {
                        guards.remove(id);
                        if guards.is_empty() {
                            holds.remove(&user);
                            true
                        } else {
                            false
                        }
                    }
                    None => false,
                }
            }
        };

        if flipped {
            tracing::debug!(user = %user, enabled, "Cursor state changed");
            let _ = self.events.send(UiEvent::CursorChanged { user, enabled });
        }
    }

    /// Drop every guard a user holds
    ///
    /// Used by disconnect cleanup. Returns whether any guard was cleared.
    pub async fn clear_user(&self, user: UserId) -> bool {
        let cleared = self.holds.write().await.remove(&user).is_some();

        if cleared {
            tracing::debug!(user = %user, "Cleared cursor guards");
            let _ = self.events.send(UiEvent::CursorChanged {
                user,
                enabled: false,
            });
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_guards() -> (CursorGuards, broadcast::Receiver<UiEvent>) {
        let (events, rx) = broadcast::channel(64);
        (CursorGuards::new(events), rx)
    }

    // ==================== Enable/Disable Tests ====================

    #[tokio::test]
    async fn cursor_disabled_with_no_guards() {
        let (guards, _rx) = test_guards();

        assert!(!guards.is_cursor_enabled(UserId::new()).await);
    }

    #[tokio::test]
    async fn asserting_guard_enables_cursor() {
        let (guards, _rx) = test_guards();
        let user = UserId::new();

        guards.set_cursor(user, "menu", true).await;

        assert!(guards.is_cursor_enabled(user).await);
    }

    #[tokio::test]
    async fn cursor_stays_enabled_while_any_guard_remains() {
        let (guards, _rx) = test_guards();
        let user = UserId::new();

        guards.set_cursor(user, "a", true).await;
        guards.set_cursor(user, "b", true).await;
        guards.set_cursor(user, "a", false).await;

        assert!(guards.is_cursor_enabled(user).await);

        guards.set_cursor(user, "b", false).await;

        assert!(!guards.is_cursor_enabled(user).await);
    }

    #[tokio::test]
    async fn double_assert_is_idempotent() {
        let (guards, _rx) = test_guards();
        let user = UserId::new();

        guards.set_cursor(user, "menu", true).await;
        guards.set_cursor(user, "menu", true).await;
        guards.set_cursor(user, "menu", false).await;

        assert!(!guards.is_cursor_enabled(user).await);
    }

    #[tokio::test]
    async fn releasing_absent_guard_is_noop() {
        let (guards, _rx) = test_guards();
        let user = UserId::new();

        guards.set_cursor(user, "never-asserted", false).await;

        assert!(!guards.is_cursor_enabled(user).await);
    }

    #[tokio::test]
    async fn guards_are_isolated_per_user() {
        let (guards, _rx) = test_guards();
        let user1 = UserId::new();
        let user2 = UserId::new();

        guards.set_cursor(user1, "menu", true).await;

        assert!(guards.is_cursor_enabled(user1).await);
        assert!(!guards.is_cursor_enabled(user2).await);
    }

    // ==================== Clear Tests ====================

    #[tokio::test]
    async fn clear_user_drops_every_guard() {
        let (guards, _rx) = test_guards();
        let user = UserId::new();

        guards.set_cursor(user, "a", true).await;
        guards.set_cursor(user, "b", true).await;

        assert!(guards.clear_user(user).await);
        assert!(!guards.is_cursor_enabled(user).await);
    }

    #[tokio::test]
    async fn clear_user_without_guards_returns_false() {
        let (guards, _rx) = test_guards();

        assert!(!guards.clear_user(UserId::new()).await);
    }

    // ==================== Event Tests ====================

    #[tokio::test]
    async fn events_fire_only_on_effective_transitions() {
        let (guards, mut rx) = test_guards();
        let user = UserId::new();

        guards.set_cursor(user, "a", true).await;
        guards.set_cursor(user, "b", true).await;
        guards.set_cursor(user, "a", false).await;
        guards.set_cursor(user, "b", false).await;

        let first = rx.try_recv().unwrap();
        assert_eq!(first, UiEvent::CursorChanged { user, enabled: true });

        let second = rx.try_recv().unwrap();
        assert_eq!(
            second,
            UiEvent::CursorChanged {
                user,
                enabled: false
            }
        );

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn clear_user_emits_disabled_event() {
        let (guards, mut rx) = test_guards();
        let user = UserId::new();

        guards.set_cursor(user, "a", true).await;
        guards.clear_user(user).await;

        let _enabled = rx.try_recv().unwrap();
        let disabled = rx.try_recv().unwrap();
        assert_eq!(
            disabled,
            UiEvent::CursorChanged {
                user,
                enabled: false
            }
        );
    }
}
