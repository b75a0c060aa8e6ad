//! SessionRegistry for per-user UI sessions
//!
//! The registry maps (user, session type) to at most one live session and
//! owns creation, lookup, replacement, and destruction. Slots are keyed by
//! the concrete Rust type of the session, so independent session kinds
//! never collide.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, broadcast};
use tokio_util::sync::CancellationToken;

use crate::cursor::CursorGuards;
use crate::error::{ConstructionError, TeardownError};
use crate::events::{EndReason, UiEvent};
use crate::user::UserId;

use super::traits::UiSession;
use super::types::{SessionId, SessionOptions};

/// Registry key: one slot per user and concrete session type
type SlotKey = (UserId, TypeId);

/// A live session and its bookkeeping
#[derive(Clone)]
struct SessionEntry {
    /// Instance identity, distinct across replacements in the same slot
    id: SessionId,
    /// Kind tag for logs and events
    kind: &'static str,
    /// The session as its capability trait, for heterogeneous listing
    session: Arc<dyn UiSession>,
    /// The session as `Any`, for typed lookup
    typed: Arc<dyn Any + Send + Sync>,
    /// Guard id asserted on behalf of this session, if it holds the cursor
    cursor_hold: Option<String>,
    /// Cancelled when the session ends, reaping its scope watcher
    reaper: CancellationToken,
}

/// Result of a batch end operation
///
/// Sessions appear in `ended` even when their teardown hook failed; the
/// failures are additionally collected so callers can report them.
#[derive(Debug, Default)]
pub struct EndReport {
    /// Sessions that were removed: (user, session id)
    pub ended: Vec<(UserId, SessionId)>,
    /// Teardown failures among the removed sessions
    pub failures: Vec<(UserId, TeardownError)>,
}

/// The core session registry
///
/// SessionRegistry provides:
/// - At most one live session per (user, session type) slot
/// - Per-slot serialization: same-slot operations behave as if under a
///   mutual-exclusion lock, different slots proceed in parallel
/// - Construct-first replacement: the old session survives a factory
///   failure and stays visible to lookups until the swap
/// - Scope-bound disposal via cancellation tokens
#[derive(Clone)]
pub struct SessionRegistry {
    /// Live sessions; guards are never held across suspension points, so
    /// lookups never block behind a slow construction or teardown
    entries: Arc<RwLock<HashMap<SlotKey, SessionEntry>>>,
    /// Lazily created per-slot serializers, held across factory and
    /// teardown awaits
    slot_locks: Arc<Mutex<HashMap<SlotKey, Arc<Mutex<()>>>>>,
    /// Cursor guard store, for sessions that hold the cursor
    cursor: CursorGuards,
    /// Lifecycle event channel
    events: broadcast::Sender<UiEvent>,
}

impl SessionRegistry {
    /// Create a new registry publishing on the given event channel
    pub fn new(cursor: CursorGuards, events: broadcast::Sender<UiEvent>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            slot_locks: Arc::new(Mutex::new(HashMap::new())),
            cursor,
            events,
        }
    }

    /// Start a new session for a user, replacing any live session of the
    /// same type
    ///
    /// The factory runs before the slot is touched: on failure the previous
    /// session (if any) is still live and the error propagates. On success
    /// the previous session is torn down and the slot swaps to the new one.
    /// If `scope` is supplied, cancelling it ends the session.
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
        let key = (user, TypeId::of::<S>());
        let lock = self.slot_lock(key).await;
        let guard = lock.lock().await;

        let hold_cursor = options.hold_cursor;
        let session = match factory(options).await {
            Ok(session) => Arc::new(session),
            Err(e) => {
                drop(guard);
                drop(lock);
                self.gc_slot_lock(key).await;
                return Err(e);
            }
        };
        Ok(self.register(user, hold_cursor, scope, session).await)
    }

    /// Return the existing session of this type, or start one
    ///
    /// Unlike [`start_session`](Self::start_session) this never tears down
    /// a live matching session; two calls with no intervening end return
    /// the identical instance and run the factory once.
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
        if let Some(existing) = self.get_session::<S>(user).await {
            return Ok(existing);
        }

        let key = (user, TypeId::of::<S>());
        let lock = self.slot_lock(key).await;
        let guard = lock.lock().await;

        // Re-check under the slot lock: a racing start may have won.
        if let Some(existing) = self.get_session::<S>(user).await {
            return Ok(existing);
        }

        let hold_cursor = options.hold_cursor;
        let session = match factory(options).await {
            Ok(session) => Arc::new(session),
            Err(e) => {
                drop(guard);
                drop(lock);
                self.gc_slot_lock(key).await;
                return Err(e);
            }
        };
        Ok(self.register(user, hold_cursor, scope, session).await)
    }

    /// End a user's session of this type
    ///
    /// Returns whether one existed. Teardown failures are logged and do
    /// not affect the return value.
    pub async fn end_session<S: UiSession>(&self, user: UserId) -> bool {
        self.end_slot((user, TypeId::of::<S>()), None, EndReason::Explicit)
            .await
            .is_some()
    }

    /// End every live session of this type across all users
    ///
    /// Individual teardown failures are collected in the report and do not
    /// stop the batch.
    pub async fn end_all_sessions<S: UiSession>(&self) -> EndReport {
        let type_id = TypeId::of::<S>();
        let users: Vec<UserId> = self
            .entries
            .read()
            .await
            .keys()
            .filter(|(_, tid)| *tid == type_id)
            .map(|(user, _)| *user)
            .collect();

        let mut report = EndReport::default();
        for user in users {
            self.end_into_report((user, type_id), EndReason::Explicit, &mut report)
                .await;
        }
        report
    }

    /// End every live session of any type for one user
    pub async fn end_user_sessions(&self, user: UserId, reason: EndReason) -> EndReport {
        let types: Vec<TypeId> = self
            .entries
            .read()
            .await
            .keys()
            .filter(|(owner, _)| *owner == user)
            .map(|(_, tid)| *tid)
            .collect();

        let mut report = EndReport::default();
        for type_id in types {
            self.end_into_report((user, type_id), reason, &mut report)
                .await;
        }
        report
    }

    /// Look up a user's session of this type
    ///
    /// Pure read: never blocks behind an in-flight construction on the
    /// same slot.
    pub async fn get_session<S: UiSession>(&self, user: UserId) -> Option<Arc<S>> {
        let entries = self.entries.read().await;
        let entry = entries.get(&(user, TypeId::of::<S>()))?;
        entry.typed.clone().downcast::<S>().ok()
    }

    /// Snapshot every live session of any type for a user
    pub async fn get_sessions(&self, user: UserId) -> Vec<Arc<dyn UiSession>> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|(key, _)| key.0 == user)
            .map(|(_, entry)| entry.session.clone())
            .collect()
    }

    /// Number of live sessions across all users and types
    pub async fn session_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Get or create the serializer for a slot
    async fn slot_lock(&self, key: SlotKey) -> Arc<Mutex<()>> {
        let mut locks = self.slot_locks.lock().await;
        locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop a slot's serializer once no task holds or waits on it
    async fn gc_slot_lock(&self, key: SlotKey) {
        let mut locks = self.slot_locks.lock().await;
        if locks
            .get(&key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&key);
        }
    }

    /// Register a freshly constructed session, replacing any live one
    ///
    /// Caller holds the slot lock.
    async fn register<S: UiSession>(
        &self,
        user: UserId,
        hold_cursor: bool,
        scope: Option<CancellationToken>,
        session: Arc<S>,
    ) -> Arc<S> {
        let key = (user, TypeId::of::<S>());
        let id = SessionId::new();
        let kind = session.kind();

        // The outgoing session stays visible to lookups until the swap
        // below; its teardown runs first.
        let outgoing = self.entries.read().await.get(&key).cloned();
        if let Some(outgoing) = &outgoing {
            self.teardown(user, outgoing).await;
        }

        // Assert the new hold before releasing the old one so the
        // effective cursor flag never dips during a replacement.
        let cursor_hold = if hold_cursor {
            let guard_id = format!("session:{id}");
            self.cursor.set_cursor(user, &guard_id, true).await;
            Some(guard_id)
        } else {
            None
        };

        let reaper = CancellationToken::new();
        let entry = SessionEntry {
            id,
            kind,
            session: session.clone(),
            typed: session.clone(),
            cursor_hold,
            reaper: reaper.clone(),
        };

        let replaced = self.entries.write().await.insert(key, entry);
        if let Some(replaced) = replaced {
            self.finish_end(user, replaced, EndReason::Replaced).await;
        }

        tracing::info!(user = %user, kind, session = %id, "UI session started");
        let _ = self.events.send(UiEvent::SessionStarted {
            user,
            session: id,
            kind: kind.to_string(),
        });

        if let Some(scope) = scope {
            self.watch_scope(key, id, scope, reaper);
        }

        session
    }

    /// Remove and tear down a slot's session
    ///
    /// With `expected` set, only ends the slot if that exact instance is
    /// still live; a replacement session is left alone.
    async fn end_slot(
        &self,
        key: SlotKey,
        expected: Option<SessionId>,
        reason: EndReason,
    ) -> Option<(SessionId, Option<TeardownError>)> {
        let lock = self.slot_lock(key).await;
        let guard = lock.lock().await;

        let entry = {
            let mut entries = self.entries.write().await;
            let matches = entries
                .get(&key)
                .is_some_and(|live| expected.is_none_or(|id| live.id == id));
            if matches { entries.remove(&key) } else { None }
        };

        let result = match entry {
            Some(entry) => {
                let id = entry.id;
                let failure = self.teardown(key.0, &entry).await;
                self.finish_end(key.0, entry, reason).await;
                Some((id, failure))
            }
            None => None,
        };

        drop(guard);
        drop(lock);
        self.gc_slot_lock(key).await;
        result
    }

    /// End one slot and fold the outcome into a batch report
    async fn end_into_report(&self, key: SlotKey, reason: EndReason, report: &mut EndReport) {
        if let Some((id, failure)) = self.end_slot(key, None, reason).await {
            report.ended.push((key.0, id));
            if let Some(failure) = failure {
                report.failures.push((key.0, failure));
            }
        }
    }

    /// Run a session's teardown hook, logging failures
    async fn teardown(&self, user: UserId, entry: &SessionEntry) -> Option<TeardownError> {
        match entry.session.on_end().await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    user = %user,
                    kind = entry.kind,
                    session = %entry.id,
                    error = %e,
                    "Session teardown failed"
                );
                Some(e)
            }
        }
    }

    /// Release a removed session's cursor hold, reap its scope watcher,
    /// and publish the end event
    async fn finish_end(&self, user: UserId, entry: SessionEntry, reason: EndReason) {
        if let Some(guard_id) = &entry.cursor_hold {
            self.cursor.set_cursor(user, guard_id, false).await;
        }
        entry.reaper.cancel();

        tracing::info!(
            user = %user,
            kind = entry.kind,
            session = %entry.id,
            reason = ?reason,
            "UI session ended"
        );
        let _ = self.events.send(UiEvent::SessionEnded {
            user,
            session: entry.id,
            kind: entry.kind.to_string(),
            reason,
        });
    }

    /// End the session when its scope cancels, unless it already ended
    fn watch_scope(
        &self,
        key: SlotKey,
        id: SessionId,
        scope: CancellationToken,
        reaper: CancellationToken,
    ) {
        let registry = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = scope.cancelled() => {
                    registry.end_slot(key, Some(id), EndReason::ScopeEnded).await;
                }
                _ = reaper.cancelled() => {}
            }
        });
    }
}
