//! Persistence for the active session.
//!
//! ## Key Types
//!
//! - `Storage`: Key-value backend trait
//! - `MemoryStorage`, `FileStorage`: Backends
//! - `Codec`: Record encoding (JSON or bincode)
//! - `SessionStore`: Versioned save/load of the three session records

pub mod backend;
pub mod persist;

pub use backend::{FileStorage, MemoryStorage, Storage};
pub use persist::{Codec, Rehydrated, SessionStore, SCHEMA_VERSION};
