//! Players and turn order.

pub mod rotation;

pub use rotation::{Player, PlayerId, PlayerRotation};
