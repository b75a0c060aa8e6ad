//! Session registry and session types

pub mod mock;
pub mod registry;
pub mod traits;
pub mod types;

// Re-export key types for convenience
pub use mock::{MockSession, SlowSession};
pub use registry::{EndReport, SessionRegistry};
pub use traits::UiSession;
pub use types::{SessionId, SessionOptions};
