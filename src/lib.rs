//! # obrolan
//!
//! Session and turn engine for a conversation card game played by 2-4
//! people passing one device around.
//!
//! ## Design Principles
//!
//! 1. **Explicit state objects**: Each manager is a plain value owned by
//!    `Game`. No globals; everything is testable without a UI.
//!
//! 2. **Silent idempotence**: Selecting twice, overdrawing, or ending a
//!    turn with nothing picked are no-ops, not errors.
//!
//! 3. **Survive a reload**: Every mutation is persisted, and a fresh
//!    `Game` built on the same storage picks up where the last one left.
//!
//! ## Flow
//!
//! ```text
//! start_new -> [opening] -> begin_playing -> [playing]
//!   select_card -> end_turn (close, draw 1, next player) ...
//!   stack empty and <= 1 table card -> [closing]
//! ```
//!
//! ## Modules
//!
//! - `core`: Errors, configuration, RNG, clock
//! - `cards`: Card definitions and the theme catalog
//! - `pools`: Stack / table / closed card pools
//! - `players`: Players and turn rotation
//! - `session`: Session lifecycle and the `Game` orchestrator
//! - `storage`: Storage backends and versioned persistence

pub mod core;
pub mod cards;
pub mod pools;
pub mod players;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use crate::core::{Clock, GameConfig, GameError, GameRng, ManualClock, Result, StorageKeys, SystemClock};

pub use crate::cards::{Card, CardId, Catalog, Theme, ThemeSlug};

pub use crate::pools::{CardPools, Pool};

pub use crate::players::{Player, PlayerId, PlayerRotation};

pub use crate::session::{Game, GameBuilder, GameView, Phase, RoomRoute, SessionLifecycle, SessionRecord, TurnOutcome};

pub use crate::storage::{Codec, FileStorage, MemoryStorage, SessionStore, Storage};
