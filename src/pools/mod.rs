//! Card pools for the active session.
//!
//! Every conversation card of a session sits in exactly one of three
//! pools: the shuffled `stack`, the visible `table`, or the `closed` pile.
//! The opening and closing cards never enter a pool.
//!
//! ## Key Types
//!
//! - `CardPools`: Pool contents, selection, and card movement
//! - `Pool`: Pool identifier for lookups
//! - `PoolViolation`: Broken invariant found in rehydrated state

pub mod manager;

pub use manager::{CardPools, Pool, PoolViolation};
