//! UiSession trait
//!
//! Session kinds are an open set: any type implementing [`UiSession`] can be
//! tracked by the registry. The registry keys slots by the concrete Rust
//! type, so each implementor gets its own per-user slot.

use async_trait::async_trait;

use crate::error::TeardownError;

/// Trait for per-user UI sessions
///
/// Implementations own whatever state their UI needs. The registry only
/// requires a kind tag for logs and events and an optional teardown hook.
/// Sessions are shared behind `Arc`, so hooks take `&self`; mutable session
/// state belongs behind the implementor's own synchronization.
#[async_trait]
pub trait UiSession: Send + Sync + 'static {
    /// Human-readable tag identifying the session kind
    fn kind(&self) -> &'static str;

    /// Teardown hook invoked when the session ends
    ///
    /// Runs on explicit end, replacement, batch end, disconnect cleanup,
    /// and scope cancellation. May suspend (e.g. to clear remote UI
    /// state) and must tolerate being invoked during cancellation.
    async fn on_end(&self) -> Result<(), TeardownError> {
        Ok(())
    }
}
