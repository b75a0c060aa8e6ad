//! Mock sessions for testing
//!
//! MockSession lets registry and manager logic be tested without a real
//! UI: it counts teardown invocations and can be told to fail its
//! teardown hook. SlowSession adds a configurable delay for concurrency
//! tests, and doubles as a second session type since slots are keyed by
//! concrete Rust type.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TeardownError;

use super::traits::UiSession;

/// Mock implementation of UiSession for testing
///
/// Call `fail_teardown()` before the session ends to make `on_end`
/// return an error. `end_count()` reports how many times the teardown
/// hook has run.
pub struct MockSession {
    kind: &'static str,
    fail_teardown: AtomicBool,
    end_count: AtomicUsize,
}

impl MockSession {
    /// Create a new MockSession with the default kind tag
    pub fn new() -> Self {
        Self::with_kind("mock")
    }

    /// Create a new MockSession with a specific kind tag
    pub fn with_kind(kind: &'static str) -> Self {
        Self {
            kind,
            fail_teardown: AtomicBool::new(false),
            end_count: AtomicUsize::new(0),
        }
    }

    /// Make the next teardown fail
    pub fn fail_teardown(&self) {
        self.fail_teardown.store(true, Ordering::SeqCst);
    }

    /// Number of times the teardown hook has run
    pub fn end_count(&self) -> usize {
        self.end_count.load(Ordering::SeqCst)
    }

    /// Whether the teardown hook has run at least once
    pub fn was_ended(&self) -> bool {
        self.end_count() > 0
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UiSession for MockSession {
    fn kind(&self) -> &'static str {
        self.kind
    }

    async fn on_end(&self) -> Result<(), TeardownError> {
        self.end_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_teardown.load(Ordering::SeqCst) {
            return Err(TeardownError::Failed("mock teardown failure".to_string()));
        }
        Ok(())
    }
}

/// MockSession wrapper that adds configurable delay to teardown
pub struct SlowSession {
    inner: MockSession,
    delay: Duration,
}

impl SlowSession {
    /// Create with the specified teardown delay
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockSession::with_kind("slow"),
            delay,
        }
    }

    /// Make the next teardown fail (delegates to inner)
    pub fn fail_teardown(&self) {
        self.inner.fail_teardown();
    }

    /// Number of times the teardown hook has run (delegates to inner)
    pub fn end_count(&self) -> usize {
        self.inner.end_count()
    }
}

#[async_trait]
impl UiSession for SlowSession {
    fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    async fn on_end(&self) -> Result<(), TeardownError> {
        // Delay before tearing down
        tokio::time::sleep(self.delay).await;
        self.inner.on_end().await
    }
}
