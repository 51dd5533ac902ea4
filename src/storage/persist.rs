//! Persisting and rehydrating the three session records.
//!
//! Each manager's state is stored under its own key as a versioned
//! envelope:
//!
//! ```text
//! {"version": 1, "state": ...}
//! ```
//!
//! On startup the legacy flat blob is removed unconditionally, then the
//! three records are loaded. A record that does not decode, carries a
//! different version, or disagrees with the other two (for example a
//! session in `playing` with no players, left behind by an interrupted
//! write) discards the whole session: all three keys are removed and the
//! engine starts with no session.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::backend::Storage;
use crate::cards::Catalog;
use crate::core::{GameConfig, GameError, Result, StorageKeys};
use crate::players::PlayerRotation;
use crate::pools::CardPools;
use crate::session::{Phase, SessionLifecycle, SessionRecord};

/// Current record schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Record encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// UTF-8 JSON, readable by the browser build.
    #[default]
    Json,
    /// Compact binary via `bincode`.
    Bincode,
}

impl Codec {
    /// Encode a value.
    pub fn encode<T: Serialize>(self, key: &str, value: &T) -> Result<Vec<u8>> {
        let encoded = match self {
            Codec::Json => serde_json::to_vec(value).map_err(|e| e.to_string()),
            Codec::Bincode => bincode::serialize(value).map_err(|e| e.to_string()),
        };
        encoded.map_err(|reason| GameError::Codec {
            key: key.to_string(),
            reason,
        })
    }

    /// Decode a value. Errors are reported as text; callers treat them as
    /// malformed state rather than failures.
    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> std::result::Result<T, String> {
        match self {
            Codec::Json => serde_json::from_slice(bytes).map_err(|e| e.to_string()),
            Codec::Bincode => bincode::deserialize(bytes).map_err(|e| e.to_string()),
        }
    }
}

/// Versioned wrapper around every stored record.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    state: T,
}

/// Outcome of reading one record.
#[derive(Debug)]
enum Loaded<T> {
    Missing,
    Present(T),
    Malformed(String),
}

/// State recovered from storage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rehydrated {
    pub session: SessionLifecycle,
    pub players: PlayerRotation,
    pub pools: CardPools,
}

/// Reads and writes the session records on a `Storage` backend.
#[derive(Debug)]
pub struct SessionStore<S: Storage> {
    storage: S,
    keys: StorageKeys,
    codec: Codec,
}

impl<S: Storage> SessionStore<S> {
    #[must_use]
    pub fn new(storage: S, config: &GameConfig) -> Self {
        Self {
            storage,
            keys: config.keys.clone(),
            codec: config.codec,
        }
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }

    #[must_use]
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Delete the previous schema's flat session blob.
    pub fn purge_legacy(&mut self) -> Result<()> {
        self.storage.remove(&self.keys.legacy)?;
        debug!(key = %self.keys.legacy, "removed legacy storage key");
        Ok(())
    }

    pub fn save_session(&mut self, session: &SessionLifecycle) -> Result<()> {
        let key = self.keys.session.clone();
        self.write(&key, &session.record())
    }

    pub fn save_players(&mut self, players: &PlayerRotation) -> Result<()> {
        let key = self.keys.players.clone();
        self.write(&key, players)
    }

    pub fn save_pools(&mut self, pools: &CardPools) -> Result<()> {
        let key = self.keys.cards.clone();
        self.write(&key, pools)
    }

    /// Write all three records.
    pub fn save_all(&mut self, session: &SessionLifecycle, players: &PlayerRotation, pools: &CardPools) -> Result<()> {
        self.save_session(session)?;
        self.save_players(players)?;
        self.save_pools(pools)
    }

    /// Remove all three records.
    pub fn discard(&mut self) -> Result<()> {
        for key in self.keys.live() {
            self.storage.remove(key)?;
        }
        Ok(())
    }

    /// Purge legacy state, then load and cross-check the three records.
    ///
    /// Only storage I/O errors fail. Unreadable or inconsistent records
    /// are discarded and an empty state is returned.
    pub fn rehydrate(&mut self, config: &GameConfig, catalog: &Catalog) -> Result<Rehydrated> {
        self.purge_legacy()?;

        let session: Loaded<Option<SessionRecord>> = self.read(&self.keys.session)?;
        let players: Loaded<PlayerRotation> = self.read(&self.keys.players)?;
        let pools: Loaded<CardPools> = self.read(&self.keys.cards)?;

        let state = match (session, players, pools) {
            (Loaded::Malformed(reason), _, _)
            | (_, Loaded::Malformed(reason), _)
            | (_, _, Loaded::Malformed(reason)) => {
                return self.reject(&reason);
            }
            (session, players, pools) => Rehydrated {
                session: SessionLifecycle::from_record(session.or_default()),
                players: players.or_default(),
                pools: pools.or_default(),
            },
        };

        if let Some(reason) = find_inconsistency(&state, config, catalog) {
            return self.reject(&reason);
        }

        match state.session.record() {
            Some(record) => info!(session = %record.session_id, phase = %record.phase, "rehydrated session"),
            None => debug!("no stored session"),
        }
        Ok(state)
    }

    fn reject(&mut self, reason: &str) -> Result<Rehydrated> {
        warn!(reason, "discarding stored session");
        self.discard()?;
        Ok(Rehydrated::default())
    }

    fn write<T: Serialize>(&mut self, key: &str, state: &T) -> Result<()> {
        let envelope = Envelope {
            version: SCHEMA_VERSION,
            state,
        };
        let bytes = self.codec.encode(key, &envelope)?;
        self.storage.set(key, &bytes)?;
        trace!(key, bytes = bytes.len(), "persisted record");
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Loaded<T>> {
        let Some(bytes) = self.storage.get(key)? else {
            return Ok(Loaded::Missing);
        };

        Ok(match self.codec.decode::<Envelope<T>>(&bytes) {
            Ok(envelope) if envelope.version == SCHEMA_VERSION => Loaded::Present(envelope.state),
            Ok(envelope) => Loaded::Malformed(format!(
                "{key} has schema version {}, expected {SCHEMA_VERSION}",
                envelope.version
            )),
            Err(e) => Loaded::Malformed(format!("{key} is unreadable: {e}")),
        })
    }
}

impl<T: Default> Loaded<T> {
    fn or_default(self) -> T {
        match self {
            Loaded::Present(state) => state,
            Loaded::Missing | Loaded::Malformed(_) => T::default(),
        }
    }
}

/// Cross-check the three records. Returns a description of the first
/// problem found.
fn find_inconsistency(state: &Rehydrated, config: &GameConfig, catalog: &Catalog) -> Option<String> {
    let Rehydrated { session, players, pools } = state;

    let Some(record) = session.record() else {
        if players.player_count() > 0 || pools.total_cards() > 0 {
            return Some("players or cards stored without a session".to_string());
        }
        return None;
    };

    if !config.accepts_player_count(players.player_count()) {
        return Some(format!("session has {} players", players.player_count()));
    }
    if players.current_player_index() >= players.player_count() {
        return Some(format!("turn index {} out of range", players.current_player_index()));
    }
    if let Some(violation) = pools.find_violation() {
        return Some(violation.to_string());
    }

    let Some(theme) = catalog.theme(record.theme) else {
        return Some(format!("theme {} is not in the catalog", record.theme));
    };
    if pools.total_cards() != theme.conversation_count() {
        return Some(format!(
            "{} cards in pools, theme {} has {}",
            pools.total_cards(),
            theme.slug,
            theme.conversation_count()
        ));
    }
    let bookend = |c: &crate::cards::Card| !c.is_conversation();
    if pools.stack().iter().chain(pools.table().iter()).chain(pools.closed().iter()).any(bookend) {
        return Some("opening or closing card found in a pool".to_string());
    }

    match record.phase {
        Phase::Opening if record.opening_shown => Some("opening marked shown before play".to_string()),
        Phase::Opening if pools.table_count() + pools.closed_count() > 0 => {
            Some("cards drawn before play started".to_string())
        }
        Phase::Playing | Phase::Closing if !record.opening_shown => {
            Some("play started without the opening step".to_string())
        }
        Phase::Playing if pools.is_table_empty() && !pools.is_stack_empty() => {
            Some("playing with an empty table and cards left to deal".to_string())
        }
        _ => None,
    }
}
