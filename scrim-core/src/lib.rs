//! scrim-core: Core library for scrim, a per-user UI session coordinator
//!
//! This crate is the coordination layer between server-side collaborators
//! (commands, event handlers) and the per-user UI sessions they construct:
//!
//! - **Session registry** - [`SessionRegistry`] tracks at most one live
//!   session per (user, session type) slot, with per-slot serialization
//! - **Cursor arbitration** - [`CursorGuards`] resolves competing cursor
//!   visibility requests through per-user guard-id sets
//! - **Facade** - [`UiManager`] exposes both under one surface
//! - **Scope binding** - a session bound to a
//!   [`CancellationToken`](tokio_util::sync::CancellationToken) ends when
//!   the token cancels
//! - **Lifecycle events** - [`UiEvent`] stream for session and cursor
//!   transitions
//!
//! # Quick Start
//!
//! ```no_run
//! use scrim_core::{ScrimError, SessionOptions, UiManager, UiSession, UserId};
//!
//! struct MenuSession;
//!
//! impl UiSession for MenuSession {
//!     fn kind(&self) -> &'static str {
//!         "menu"
//!     }
//! }
//!
//! async fn example() -> Result<(), ScrimError> {
//!     let manager = UiManager::default();
//!     let user = UserId::new();
//!
//!     // Start a session; an existing menu session would be replaced
//!     let session = manager
//!         .start_session(user, SessionOptions::default(), None, |_| async {
//!             Ok(MenuSession)
//!         })
//!         .await?;
//!     println!("Started {} session", session.kind());
//!
//!     // Keep the cursor visible while the menu is open
//!     manager.set_cursor(user, "menu", true).await;
//!
//!     manager.end_session::<MenuSession>(user).await;
//!     manager.set_cursor(user, "menu", false).await;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                    UiManager                     │
//! │  ┌──────────────────────┐  ┌──────────────────┐  │
//! │  │   SessionRegistry    │  │   CursorGuards   │  │
//! │  │  one live session    │  │  per-user guard  │  │
//! │  │  per (user, type)    │  │     id sets      │  │
//! │  └──────────────────────┘  └──────────────────┘  │
//! │                broadcast<UiEvent>                │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod cursor;
pub mod error;
pub mod events;
pub mod manager;
pub mod session;
pub mod user;

// Re-export key types for convenience
pub use cursor::CursorGuards;
pub use error::{ConstructionError, ScrimError, TeardownError};
pub use events::{EndReason, UiEvent};
pub use manager::{UiManager, UiManagerConfig};
pub use session::{
    EndReport, MockSession, SessionId, SessionOptions, SessionRegistry, SlowSession, UiSession,
};
pub use user::UserId;
