//! Game orchestration.
//!
//! `Game` owns the three managers and the session store and is the only
//! thing the presentation layer talks to. Every user intent is one method:
//!
//! | Intent | Method |
//! | --- | --- |
//! | start a new game | `start_new` |
//! | dismiss the opening card | `begin_playing` |
//! | pick a table card | `select_card` |
//! | end the turn | `end_turn` |
//! | seat or unseat a player | `add_player`, `remove_player` |
//! | force stop / back to menu | `force_stop` |
//! | open a room URL | `enter_room` |
//!
//! Cross-manager rules (one draw per player when play starts, a
//! replacement draw per turn, the switch to closing once the pool runs
//! dry) live here rather than inside any single manager. After each
//! operation the records it touched are persisted.

use im::Vector;
use tracing::{debug, info};

use super::lifecycle::{Phase, SessionLifecycle, SessionRecord};
use crate::cards::{Card, CardId, Catalog, ThemeSlug};
use crate::core::clock::unix_millis;
use crate::core::{Clock, GameConfig, GameError, GameRng, Result, SystemClock};
use crate::players::{Player, PlayerId, PlayerRotation};
use crate::pools::CardPools;
use crate::storage::{SessionStore, Storage};

/// Result of a resolved turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The card that was discussed and is now closed.
    pub closed: Card,
    /// Replacement drawn onto the table, if the stack had one.
    pub drawn: Option<Card>,
    /// Whose turn it is now.
    pub next_player: Option<Player>,
    /// The session moved to the closing phase.
    pub entered_closing: bool,
}

/// Where a room URL leads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoomRoute {
    /// The URL names the active session.
    Room(Phase),
    /// A session exists, but not this one.
    NotFound,
    /// No session at all; back to the entry screen.
    Entry,
}

/// Read-only snapshot for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameView {
    pub session_id: Option<String>,
    pub theme: Option<ThemeSlug>,
    pub phase: Option<Phase>,
    pub players: Vec<Player>,
    pub current_player_index: usize,
    pub current_player: Option<Player>,
    pub table: Vector<Card>,
    pub selected: Option<Card>,
    pub stack_count: usize,
    pub table_count: usize,
    pub closed_count: usize,
    /// Set while the opening card should be on screen.
    pub opening_card: Option<Card>,
    /// Set once the session is closing and the theme has a closing card.
    pub closing_card: Option<Card>,
    /// A card is selected during play.
    pub can_end_turn: bool,
    /// Table grid width for the player count.
    pub grid_columns: usize,
}

/// Table grid width: a row for 2 or 3 players, 2x2 for 4.
#[must_use]
pub fn grid_columns(player_count: usize) -> usize {
    match player_count {
        3 => 3,
        _ => 2,
    }
}

/// Builder for `Game`.
///
/// ```
/// use obrolan::session::GameBuilder;
/// use obrolan::storage::MemoryStorage;
///
/// let game = GameBuilder::new().seed(7).build(MemoryStorage::new()).unwrap();
/// assert!(game.existing_session().is_none());
/// ```
pub struct GameBuilder {
    config: GameConfig,
    catalog: Option<Catalog>,
    clock: Option<Box<dyn Clock>>,
    seed: Option<u64>,
}

impl Default for GameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GameBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            catalog: None,
            clock: None,
            seed: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom catalog instead of the built-in themes.
    #[must_use]
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Fix the shuffle seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Purge legacy state, rehydrate from `storage`, and return a ready game.
    ///
    /// Fails with `InvalidSetup` if the configuration is inconsistent.
    pub fn build<S: Storage>(self, storage: S) -> Result<Game<S>> {
        self.config.validate()?;
        let catalog = self.catalog.unwrap_or_else(Catalog::builtin);
        let mut store = SessionStore::new(storage, &self.config);
        let state = store.rehydrate(&self.config, &catalog)?;

        Ok(Game {
            config: self.config,
            catalog,
            store,
            clock: self.clock.unwrap_or_else(|| Box::new(SystemClock)),
            rng: self.seed.map_or_else(GameRng::from_entropy, GameRng::new),
            session: state.session,
            players: state.players,
            pools: state.pools,
        })
    }
}

/// A local game table.
///
/// ## Example
///
/// ```
/// use obrolan::cards::ThemeSlug;
/// use obrolan::session::{GameBuilder, Phase};
/// use obrolan::storage::MemoryStorage;
///
/// let mut game = GameBuilder::new().seed(1).build(MemoryStorage::new()).unwrap();
/// game.start_new(ThemeSlug::Family, &["Ana", "Budi"]).unwrap();
/// game.begin_playing().unwrap();
///
/// let pick = game.view().table[0].id.clone();
/// game.select_card(&pick).unwrap();
/// let outcome = game.end_turn().unwrap().unwrap();
///
/// assert_eq!(outcome.closed.id, pick);
/// assert_eq!(game.view().phase, Some(Phase::Playing));
/// assert_eq!(game.view().current_player.unwrap().name, "Budi");
/// ```
pub struct Game<S: Storage> {
    config: GameConfig,
    catalog: Catalog,
    store: SessionStore<S>,
    clock: Box<dyn Clock>,
    rng: GameRng,
    session: SessionLifecycle,
    players: PlayerRotation,
    pools: CardPools,
}

impl<S: Storage> Game<S> {
    /// Start a new session, replacing any existing one.
    ///
    /// Names are trimmed and blanks dropped; the remaining count must be
    /// within the configured player range. A theme without an opening
    /// card skips straight to play.
    pub fn start_new<N: AsRef<str>>(&mut self, theme: ThemeSlug, player_names: &[N]) -> Result<&SessionRecord> {
        let named = player_names.iter().filter(|n| !n.as_ref().trim().is_empty()).count();
        if !self.config.accepts_player_count(named) {
            return Err(GameError::invalid_setup(format!(
                "need {} to {} named players, got {named}",
                self.config.min_players, self.config.max_players
            )));
        }

        let theme = self.catalog.require(theme)?;
        let start = self.session.initialize_session(theme, player_names, self.clock.now())?;
        self.players.set_players(start.players);
        self.pools.initialize_cards(start.conversation_cards, &mut self.rng);
        self.store.save_all(&self.session, &self.players, &self.pools)?;

        let skip_opening = self.session.record().is_some_and(|r| r.opening_card.is_none());
        if skip_opening {
            debug!("theme has no opening card, starting play");
            self.begin_playing()?;
        }

        self.session.record().ok_or(GameError::NoActiveSession)
    }

    /// Leave the opening phase and deal one card per player.
    ///
    /// Fails with `InvalidTransition` outside the opening phase.
    pub fn begin_playing(&mut self) -> Result<Vec<Card>> {
        let now = self.clock.now();
        self.session.start_playing(now)?;
        let drawn = self.pools.draw_cards_to_table(self.players.player_count());

        if self.should_enter_closing() {
            self.session.start_closing(now)?;
        }

        // Cards first: a deal cut short then reads as an opening session
        // with cards drawn, which rehydration rejects.
        self.store.save_pools(&self.pools)?;
        self.store.save_session(&self.session)?;
        Ok(drawn)
    }

    /// Pick a table card for the current turn.
    ///
    /// No-op outside play, when a card is already picked, or when `id` is
    /// not on the table. Returns whether the selection took.
    pub fn select_card(&mut self, id: &CardId) -> Result<bool> {
        if !self.session.is_in_playing_phase() || !self.pools.select_card(id) {
            return Ok(false);
        }
        self.store.save_pools(&self.pools)?;
        Ok(true)
    }

    /// Undo the current pick.
    pub fn deselect_card(&mut self) -> Result<Option<Card>> {
        let card = self.pools.deselect_card();
        if card.is_some() {
            self.store.save_pools(&self.pools)?;
        }
        Ok(card)
    }

    /// Resolve the current turn.
    ///
    /// Closes the picked card, draws a replacement if the stack has one,
    /// passes the turn, and enters closing once the pool is exhausted.
    /// Returns `None` (and changes nothing) when no card is picked.
    pub fn end_turn(&mut self) -> Result<Option<TurnOutcome>> {
        if !self.session.is_in_playing_phase() {
            return Ok(None);
        }
        let Some(closed) = self.pools.move_selected_card_to_closed() else {
            return Ok(None);
        };

        let drawn = if self.pools.is_stack_empty() {
            None
        } else {
            self.pools.draw_cards_to_table(1).into_iter().next()
        };
        self.players.advance_to_next_player();

        let now = self.clock.now();
        let entered_closing = self.should_enter_closing();
        if entered_closing {
            self.session.start_closing(now)?;
        } else {
            self.session.touch(now);
        }

        self.store.save_all(&self.session, &self.players, &self.pools)?;

        let outcome = TurnOutcome {
            closed,
            drawn,
            next_player: self.players.current_player().cloned(),
            entered_closing,
        };
        debug!(
            closed = %outcome.closed.id,
            drawn = ?outcome.drawn.as_ref().map(|c| c.id.as_str()),
            entered_closing,
            "turn resolved"
        );
        Ok(Some(outcome))
    }

    /// Whether the session should move to closing now: in play, nothing
    /// left to draw, and at most one table card left.
    #[must_use]
    pub fn should_enter_closing(&self) -> bool {
        self.session.is_in_playing_phase() && self.pools.is_exhausted()
    }

    /// Seat a late arrival at the end of the order.
    ///
    /// The name is trimmed and must not be blank; the table must have room
    /// under the configured maximum.
    pub fn add_player(&mut self, name: &str) -> Result<Player> {
        if !self.session.is_initialized() {
            return Err(GameError::NoActiveSession);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::invalid_setup("player name is blank"));
        }
        if self.players.player_count() >= self.config.max_players {
            return Err(GameError::invalid_setup(format!(
                "table is full at {} players",
                self.config.max_players
            )));
        }

        let millis = unix_millis(self.clock.now());
        let id = (self.players.player_count()..)
            .map(|seat| PlayerId::generate(seat, millis))
            .find(|id| !self.players.contains(id))
            .ok_or_else(|| GameError::invalid_setup("no free player id"))?;
        let player = Player::new(id, name);

        self.players.add_player(player.clone());
        self.store.save_players(&self.players)?;
        info!(id = %player.id, name = %player.name, "player joined");
        Ok(player)
    }

    /// Unseat a player, keeping at least the configured minimum.
    ///
    /// Returns `None` when `id` is not seated.
    pub fn remove_player(&mut self, id: &PlayerId) -> Result<Option<Player>> {
        if !self.players.contains(id) {
            return Ok(None);
        }
        if self.players.player_count() <= self.config.min_players {
            return Err(GameError::invalid_setup(format!(
                "a session needs at least {} players",
                self.config.min_players
            )));
        }

        let removed = self.players.remove_player(id);
        self.store.save_players(&self.players)?;
        Ok(removed)
    }

    /// Hand the turn to a specific seat. Out-of-range seats are ignored.
    pub fn set_current_player_index(&mut self, index: usize) -> Result<bool> {
        if !self.players.set_current_player_index(index) {
            return Ok(false);
        }
        self.store.save_players(&self.players)?;
        Ok(true)
    }

    /// Abandon the session and reset every record to empty.
    pub fn force_stop(&mut self) -> Result<()> {
        if let Some(id) = self.session.session_id() {
            info!(session = id, "force stop");
        }
        self.session.clear_session();
        self.players.reset();
        self.pools.reset();
        self.store.save_all(&self.session, &self.players, &self.pools)
    }

    /// Route a room URL against the stored session. Never mutates state.
    #[must_use]
    pub fn enter_room(&self, url_session_id: &str) -> RoomRoute {
        match self.session.record() {
            None => RoomRoute::Entry,
            Some(record) if record.session_id == url_session_id => RoomRoute::Room(record.phase),
            Some(record) => {
                debug!(stored = %record.session_id, requested = url_session_id, "session mismatch");
                RoomRoute::NotFound
            }
        }
    }

    /// The session the entry screen may offer to resume.
    #[must_use]
    pub fn existing_session(&self) -> Option<&SessionRecord> {
        self.session.record()
    }

    /// True while a session exists.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.session.is_initialized()
    }

    /// Snapshot everything the presentation layer renders.
    #[must_use]
    pub fn view(&self) -> GameView {
        let record = self.session.record();
        let phase = self.session.phase();

        GameView {
            session_id: self.session.session_id().map(str::to_string),
            theme: self.session.theme(),
            phase,
            players: self.players.players().to_vec(),
            current_player_index: self.players.current_player_index(),
            current_player: self.players.current_player().cloned(),
            table: self.pools.table().clone(),
            selected: self.pools.selected().cloned(),
            stack_count: self.pools.stack_count(),
            table_count: self.pools.table_count(),
            closed_count: self.pools.closed_count(),
            opening_card: record
                .filter(|_| self.session.should_show_opening())
                .and_then(|r| r.opening_card.clone()),
            closing_card: record
                .filter(|_| self.session.should_show_closing())
                .and_then(|r| r.closing_card.clone()),
            can_end_turn: phase == Some(Phase::Playing) && self.pools.has_selected_card(),
            grid_columns: grid_columns(self.players.player_count()),
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn session(&self) -> &SessionLifecycle {
        &self.session
    }

    #[must_use]
    pub fn players(&self) -> &PlayerRotation {
        &self.players
    }

    #[must_use]
    pub fn pools(&self) -> &CardPools {
        &self.pools
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        self.store.storage()
    }

    /// Give back the storage backend, e.g. to rebuild after a "reload".
    #[must_use]
    pub fn into_storage(self) -> S {
        self.store.into_storage()
    }
}
