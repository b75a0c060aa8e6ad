//! Error types for scrim-core

use thiserror::Error;

/// Top-level error type for scrim-core
#[derive(Error, Debug)]
pub enum ScrimError {
    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),

    #[error("Teardown error: {0}")]
    Teardown(#[from] TeardownError),
}

/// Errors from session factories
///
/// Surfaced to callers of start operations. The registry slot is left
/// untouched: an absent slot stays absent, and a session being replaced
/// stays live.
#[derive(Error, Debug)]
pub enum ConstructionError {
    #[error("Session factory rejected options: {0}")]
    OptionsRejected(String),

    #[error("Session construction failed: {0}")]
    Failed(String),
}

/// Errors from session teardown hooks
///
/// Teardown failures are logged and collected, never propagated to the
/// operation that triggered the teardown.
#[derive(Error, Debug)]
pub enum TeardownError {
    #[error("Teardown failed: {0}")]
    Failed(String),
}
