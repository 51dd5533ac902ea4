//! Core engine types: errors, configuration, RNG, clock.
//!
//! These are shared by every manager and carry no game rules of their own.

pub mod clock;
pub mod config;
pub mod error;
pub mod rng;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{GameConfig, StorageKeys};
pub use error::{GameError, Result};
pub use rng::GameRng;
