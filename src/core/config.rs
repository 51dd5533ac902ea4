//! Engine configuration.
//!
//! `GameConfig` holds the knobs that are fixed for the lifetime of a
//! `Game`: how many players a table seats, where each record is stored,
//! and how records are encoded. Defaults match the browser build's
//! local-storage keys so existing saves keep loading.

use serde::{Deserialize, Serialize};

use super::error::{GameError, Result};
use crate::storage::Codec;

/// Storage keys for the three persisted records plus the legacy blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
    /// Session record (identity, theme, phase, bookend cards).
    pub session: String,
    /// Player list and turn index.
    pub players: String,
    /// Stack, table, closed, selection.
    pub cards: String,
    /// Flat session blob from the previous schema. Purged on startup.
    pub legacy: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            session: "game-session-state".to_string(),
            players: "player-state".to_string(),
            cards: "card-state".to_string(),
            legacy: "gameSession".to_string(),
        }
    }
}

impl StorageKeys {
    /// The three live record keys, in write order.
    #[must_use]
    pub fn live(&self) -> [&str; 3] {
        [&self.session, &self.players, &self.cards]
    }

    /// Prefix every key, e.g. to keep several profiles in one store.
    #[must_use]
    pub fn prefixed(prefix: &str) -> Self {
        let base = Self::default();
        Self {
            session: format!("{prefix}{}", base.session),
            players: format!("{prefix}{}", base.players),
            cards: format!("{prefix}{}", base.cards),
            legacy: format!("{prefix}{}", base.legacy),
        }
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Fewest players a session accepts.
    pub min_players: usize,

    /// Most players a session accepts.
    pub max_players: usize,

    /// Record keys.
    pub keys: StorageKeys,

    /// Record encoding.
    pub codec: Codec,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 4,
            keys: StorageKeys::default(),
            codec: Codec::Json,
        }
    }
}

impl GameConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the accepted player range.
    ///
    /// Panics if `min < 2` or `min > max`; a conversation needs two people.
    #[must_use]
    pub fn with_player_range(mut self, min: usize, max: usize) -> Self {
        assert!(min >= 2, "A session needs at least 2 players");
        assert!(min <= max, "min_players must not exceed max_players");
        self.min_players = min;
        self.max_players = max;
        self
    }

    /// Use custom storage keys.
    #[must_use]
    pub fn with_keys(mut self, keys: StorageKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Use a different record encoding.
    #[must_use]
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Check a configuration that did not come through the builders,
    /// e.g. one read from a file.
    pub fn validate(&self) -> Result<()> {
        if self.min_players < 2 {
            return Err(GameError::invalid_setup(format!(
                "min_players is {}, a session needs at least 2",
                self.min_players
            )));
        }
        if self.min_players > self.max_players {
            return Err(GameError::invalid_setup(format!(
                "min_players {} exceeds max_players {}",
                self.min_players, self.max_players
            )));
        }
        let [session, players, cards] = self.keys.live();
        if session == players || session == cards || players == cards {
            return Err(GameError::invalid_setup("storage keys must be distinct"));
        }
        Ok(())
    }

    /// Check whether `count` players may sit at the table.
    #[must_use]
    pub fn accepts_player_count(&self, count: usize) -> bool {
        (self.min_players..=self.max_players).contains(&count)
    }
}
