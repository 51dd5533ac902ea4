//! Session lifecycle and game orchestration.
//!
//! ## Key Types
//!
//! - `Phase`: opening, playing, closing
//! - `SessionRecord`: Persisted session identity and phase
//! - `SessionLifecycle`: Single writer of the session record
//! - `Game`: Orchestrates sessions, pools and players; the presentation API
//! - `GameView`: Render snapshot
//! - `RoomRoute`: Result of matching a room URL against the stored session

pub mod game;
pub mod lifecycle;

pub use game::{grid_columns, Game, GameBuilder, GameView, RoomRoute, TurnOutcome};
pub use lifecycle::{Phase, SessionLifecycle, SessionRecord, SessionStart};
