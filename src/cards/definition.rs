//! Card definitions.
//!
//! A `Card` is static catalog data. Sessions move cards between pools
//! but never change them, so a card's identity is all the pools compare.

use serde::{Deserialize, Serialize};

/// Unique identifier for a card within the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A conversation card.
///
/// Opening and closing cards bookend a session and are kept out of the
/// shuffled pool. Everything else is an ordinary conversation card.
///
/// ## Example
///
/// ```
/// use obrolan::cards::Card;
///
/// let card = Card::new("family-1", "What tradition should we start?");
/// assert!(card.is_conversation());
///
/// let opening = Card::opening("family-opening", "Listen without judging.");
/// assert!(!opening.is_conversation());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Unique identifier.
    pub id: CardId,

    /// Prompt shown to the players.
    pub content: String,

    /// Shown once before play starts.
    pub is_opening: bool,

    /// Shown once after play ends.
    pub is_closing: bool,
}

impl Card {
    /// Create an ordinary conversation card.
    #[must_use]
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: CardId::new(id),
            content: content.into(),
            is_opening: false,
            is_closing: false,
        }
    }

    /// Create an opening card.
    #[must_use]
    pub fn opening(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            is_opening: true,
            ..Self::new(id, content)
        }
    }

    /// Create a closing card.
    #[must_use]
    pub fn closing(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            is_closing: true,
            ..Self::new(id, content)
        }
    }

    /// True for cards that go into the shuffled pool.
    #[must_use]
    pub fn is_conversation(&self) -> bool {
        !self.is_opening && !self.is_closing
    }
}
