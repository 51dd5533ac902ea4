//! Error taxonomy for the session engine.
//!
//! The domain has no adversarial input, so the set is narrow. Most
//! "wrong" user actions (double selection, overdrawing, ending a turn
//! with nothing selected) are no-ops and never reach this type.
//! Malformed persisted state is also not an error: rehydration logs it
//! and falls back to "no session".

use thiserror::Error;

use crate::cards::ThemeSlug;
use crate::session::Phase;

/// Errors raised by session operations.
#[derive(Debug, Error)]
pub enum GameError {
    /// Player names or count rejected at session creation.
    #[error("invalid setup: {reason}")]
    InvalidSetup { reason: String },

    /// A phase change that is not `opening -> playing -> closing`.
    #[error("invalid phase transition from {from} to {to}")]
    InvalidTransition { from: Phase, to: Phase },

    /// A phase operation was attempted with no session in progress.
    #[error("no active session")]
    NoActiveSession,

    /// The requested theme is not in the catalog.
    #[error("theme {0} is not in the catalog")]
    UnknownTheme(ThemeSlug),

    /// Catalog content breaks a card invariant.
    #[error("invalid catalog: {reason}")]
    InvalidCatalog { reason: String },

    /// Storage backend I/O failure.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// A record could not be encoded for storage.
    #[error("failed to encode record {key}: {reason}")]
    Codec { key: String, reason: String },
}

impl GameError {
    pub(crate) fn invalid_setup(reason: impl Into<String>) -> Self {
        Self::InvalidSetup { reason: reason.into() }
    }

    pub(crate) fn invalid_catalog(reason: impl Into<String>) -> Self {
        Self::InvalidCatalog { reason: reason.into() }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GameError>;
