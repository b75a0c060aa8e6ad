//! UiManager facade
//!
//! UiManager composes the session registry and cursor guard behind one
//! surface, the only interface external collaborators call. Clones are
//! cheap and share the same underlying state.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::cursor::CursorGuards;
use crate::error::ConstructionError;
use crate::events::{EndReason, UiEvent};
use crate::session::registry::{EndReport, SessionRegistry};
use crate::session::traits::UiSession;
use crate::session::types::SessionOptions;
use crate::user::UserId;

/// Configuration for the UI manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiManagerConfig {
    /// Capacity of the lifecycle event channel
    ///
    /// Values below 1 are treated as 1.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_event_capacity() -> usize {
    256
}

impl Default for UiManagerConfig {
    fn default() -> Self {
        Self {
            event_capacity: default_event_capacity(),
        }
    }
}

impl UiManagerConfig {
    /// Create a new config with a custom event channel capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

/// Facade over the session registry and cursor guard
///
/// UiManager provides:
/// - Session start/end/replace/lookup, delegated to [`SessionRegistry`]
/// - Cursor arbitration, delegated to [`CursorGuards`]
/// - A lifecycle event stream via [`subscribe`](Self::subscribe)
/// - Cleanup of a user's sessions and guards on disconnect
#[derive(Clone)]
pub struct UiManager {
    registry: SessionRegistry,
    cursor: CursorGuards,
    events: broadcast::Sender<UiEvent>,
}

impl UiManager {
    /// Create a new UiManager
    pub fn new(config: UiManagerConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let cursor = CursorGuards::new(events.clone());
        let registry = SessionRegistry::new(cursor.clone(), events.clone());
        Self {
            registry,
            cursor,
            events,
        }
    }

    /// Start a new session for a user, replacing any live session of the
    /// same type
    pub async fn start_session<S, F, Fut>(
        &self,
        user: UserId,
        options: SessionOptions,
        scope: Option<CancellationToken>,
        factory: F,
    ) -> Result<Arc<S>, ConstructionError>
    where
        S: UiSession,
        F: FnOnce(SessionOptions) -> Fut + Send,
        Fut: Future<Output = Result<S, ConstructionError>> + Send,
    {
        self.registry
            .start_session(user, options, scope, factory)
            .await
    }

    /// Return the user's existing session of this type, or start one
    pub async fn get_or_start_session<S, F, Fut>(
        &self,
        user: UserId,
        options: SessionOptions,
        scope: Option<CancellationToken>,
        factory: F,
    ) -> Result<Arc<S>, ConstructionError>
    where
        S: UiSession,
        F: FnOnce(SessionOptions) -> Fut + Send,
        Fut: Future<Output = Result<S, ConstructionError>> + Send,
    {
        self.registry
            .get_or_start_session(user, options, scope, factory)
            .await
    }

    /// End a user's session of this type; returns whether one existed
    pub async fn end_session<S: UiSession>(&self, user: UserId) -> bool {
        self.registry.end_session::<S>(user).await
    }

    /// End every live session of this type across all users
    pub async fn end_all_sessions<S: UiSession>(&self) -> EndReport {
        self.registry.end_all_sessions::<S>().await
    }

    /// Look up a user's session of this type
    pub async fn get_session<S: UiSession>(&self, user: UserId) -> Option<Arc<S>> {
        self.registry.get_session::<S>(user).await
    }

    /// Snapshot every live session of any type for a user
    pub async fn get_sessions(&self, user: UserId) -> Vec<Arc<dyn UiSession>> {
        self.registry.get_sessions(user).await
    }

    /// Number of live sessions across all users and types
    pub async fn session_count(&self) -> usize {
        self.registry.session_count().await
    }

    /// Whether the cursor is effectively enabled for a user
    pub async fn is_cursor_enabled(&self, user: UserId) -> bool {
        self.cursor.is_cursor_enabled(user).await
    }

    /// Assert or release one caller's cursor guard id for a user
    pub async fn set_cursor(&self, user: UserId, id: &str, enabled: bool) {
        self.cursor.set_cursor(user, id, enabled).await;
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    /// Clean up after a user disconnects
    ///
    /// Ends every session the user has and drops all their cursor guards.
    pub async fn handle_user_disconnect(&self, user: UserId) -> EndReport {
        let report = self
            .registry
            .end_user_sessions(user, EndReason::Disconnected)
            .await;
        let cleared = self.cursor.clear_user(user).await;

        if !report.ended.is_empty() || cleared {
            tracing::info!(
                user = %user,
                ended = report.ended.len(),
                "Cleaned up after user disconnect"
            );
        }
        report
    }
}

impl Default for UiManager {
    fn default() -> Self {
        Self::new(UiManagerConfig::default())
    }
}
