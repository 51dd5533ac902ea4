//! Player identification and turn rotation.
//!
//! ## PlayerId
//!
//! String identifier `player-{n}-{millis}`, where `n` is the 1-based seat
//! and `millis` the session's creation time (or the join time for a
//! player added later). Unique across sessions.
//!
//! ## PlayerRotation
//!
//! Ordered seat list plus the index of whose turn it is. Turns advance
//! unconditionally; the one-pick-per-turn guard lives in the card pools.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

/// Player identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Build the id for seat `index` (0-based) of a session created at
    /// `created_millis`.
    ///
    /// ```
    /// use obrolan::players::PlayerId;
    ///
    /// assert_eq!(PlayerId::generate(0, 1700).as_str(), "player-1-1700");
    /// ```
    #[must_use]
    pub fn generate(index: usize, created_millis: i64) -> Self {
        Self(format!("player-{}-{}", index + 1, created_millis))
    }

    /// Get the raw ID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A seated player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }

    /// Seat `names` in order, deriving ids from the creation time.
    pub fn seat_all<'a>(
        names: impl IntoIterator<Item = &'a str>,
        created_millis: i64,
    ) -> SmallVec<[Player; 4]> {
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Player::new(PlayerId::generate(i, created_millis), name))
            .collect()
    }
}

/// Seat order and whose turn it is.
///
/// ## Example
///
/// ```
/// use obrolan::players::{Player, PlayerRotation};
///
/// let mut rotation = PlayerRotation::new();
/// rotation.set_players(Player::seat_all(["Ana", "Budi", "Citra"], 0));
///
/// assert_eq!(rotation.current_player().unwrap().name, "Ana");
/// rotation.advance_to_next_player();
/// assert_eq!(rotation.current_player().unwrap().name, "Budi");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRotation {
    players: SmallVec<[Player; 4]>,
    current_player_index: usize,
}

impl PlayerRotation {
    /// Create an empty rotation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the seat list and give the first seat the turn.
    pub fn set_players(&mut self, players: impl IntoIterator<Item = Player>) {
        self.players = players.into_iter().collect();
        self.current_player_index = 0;
    }

    /// Seat one more player at the end of the order.
    ///
    /// Ignored when a player with the same id is already seated.
    pub fn add_player(&mut self, player: Player) -> bool {
        if self.contains(&player.id) {
            return false;
        }
        debug!(id = %player.id, "player added");
        self.players.push(player);
        true
    }

    /// Unseat a player.
    ///
    /// The turn stays with whoever held it. If the removed player held it,
    /// it passes to the next seat.
    pub fn remove_player(&mut self, id: &PlayerId) -> Option<Player> {
        let seat = self.players.iter().position(|p| &p.id == id)?;
        let removed = self.players.remove(seat);

        if seat < self.current_player_index {
            self.current_player_index -= 1;
        }
        if self.current_player_index >= self.players.len() {
            self.current_player_index = 0;
        }
        debug!(id = %removed.id, index = self.current_player_index, "player removed");
        Some(removed)
    }

    /// Hand the turn to a specific seat. Out-of-range seats are ignored.
    pub fn set_current_player_index(&mut self, index: usize) -> bool {
        if index >= self.players.len() {
            return false;
        }
        self.current_player_index = index;
        true
    }

    /// Pass the turn to the next seat, wrapping around.
    ///
    /// No-op on an empty table.
    pub fn advance_to_next_player(&mut self) {
        if self.players.is_empty() {
            return;
        }
        self.current_player_index = (self.current_player_index + 1) % self.players.len();
        debug!(index = self.current_player_index, "advanced turn");
    }

    /// Remove every player.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whose turn it is.
    #[must_use]
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    #[must_use]
    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Check if `id` is seated.
    #[must_use]
    pub fn contains(&self, id: &PlayerId) -> bool {
        self.players.iter().any(|p| &p.id == id)
    }

    /// Check if it is `id`'s turn.
    #[must_use]
    pub fn is_player_turn(&self, id: &PlayerId) -> bool {
        self.current_player().is_some_and(|p| &p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotation(n: usize) -> PlayerRotation {
        let names = ["Ana", "Budi", "Citra", "Dewi"];
        let mut rotation = PlayerRotation::new();
        rotation.set_players(Player::seat_all(names.into_iter().take(n), 1_000));
        rotation
    }

    #[test]
    fn test_seat_ids() {
        let seated = Player::seat_all(["a", "b"], 42);
        assert_eq!(seated[0].id.as_str(), "player-1-42");
        assert_eq!(seated[1].id.as_str(), "player-2-42");
        assert_eq!(format!("{}", seated[1].id), "player-2-42");
    }

    #[test]
    fn test_set_players_resets_index() {
        let mut rotation = rotation(3);
        rotation.advance_to_next_player();
        assert_eq!(rotation.current_player_index(), 1);

        rotation.set_players(Player::seat_all(["x", "y"], 5));
        assert_eq!(rotation.current_player_index(), 0);
        assert_eq!(rotation.player_count(), 2);
    }

    #[test]
    fn test_rotation_wraps() {
        let mut rotation = rotation(3);
        let order: Vec<_> = (0..4)
            .map(|_| {
                let name = rotation.current_player().unwrap().name.clone();
                rotation.advance_to_next_player();
                name
            })
            .collect();

        assert_eq!(order, vec!["Ana", "Budi", "Citra", "Ana"]);
    }

    #[test]
    fn test_full_cycle_returns_to_start() {
        for n in 2..=4 {
            let mut rotation = rotation(n);
            rotation.advance_to_next_player();
            let start = rotation.current_player_index();

            for _ in 0..n {
                rotation.advance_to_next_player();
            }
            assert_eq!(rotation.current_player_index(), start);
        }
    }

    #[test]
    fn test_empty_rotation() {
        let mut rotation = PlayerRotation::new();
        assert!(rotation.current_player().is_none());

        rotation.advance_to_next_player();
        assert_eq!(rotation.current_player_index(), 0);
    }

    #[test]
    fn test_is_player_turn() {
        let mut rotation = rotation(2);
        let second = rotation.players()[1].id.clone();

        assert!(!rotation.is_player_turn(&second));
        rotation.advance_to_next_player();
        assert!(rotation.is_player_turn(&second));
    }

    #[test]
    fn test_reset() {
        let mut rotation = rotation(4);
        rotation.reset();
        assert_eq!(rotation, PlayerRotation::new());
    }

    #[test]
    fn test_add_player() {
        let mut rotation = rotation(2);
        let extra = Player::new(PlayerId::generate(2, 1_000), "Citra");

        assert!(rotation.add_player(extra.clone()));
        assert!(!rotation.add_player(extra));
        assert_eq!(rotation.player_count(), 3);
        assert_eq!(rotation.players()[2].name, "Citra");
        assert_eq!(rotation.current_player_index(), 0);
    }

    #[test]
    fn test_remove_player_before_current_keeps_turn() {
        let mut rotation = rotation(4);
        rotation.set_current_player_index(2);
        let first = rotation.players()[0].id.clone();

        let removed = rotation.remove_player(&first).unwrap();

        assert_eq!(removed.name, "Ana");
        assert_eq!(rotation.current_player().unwrap().name, "Citra");
        assert_eq!(rotation.current_player_index(), 1);
    }

    #[test]
    fn test_remove_current_player_passes_turn() {
        let mut rotation = rotation(3);
        rotation.set_current_player_index(1);
        let budi = rotation.players()[1].id.clone();

        rotation.remove_player(&budi);
        assert_eq!(rotation.current_player().unwrap().name, "Citra");

        // Removing the last seat while it holds the turn wraps to the first.
        let citra = rotation.players()[1].id.clone();
        rotation.remove_player(&citra);
        assert_eq!(rotation.current_player_index(), 0);
        assert_eq!(rotation.current_player().unwrap().name, "Ana");
    }

    #[test]
    fn test_remove_unknown_or_last_player() {
        let mut rotation = rotation(2);
        assert!(rotation.remove_player(&PlayerId::generate(9, 0)).is_none());
        assert_eq!(rotation.player_count(), 2);

        let ids: Vec<_> = rotation.players().iter().map(|p| p.id.clone()).collect();
        for id in &ids {
            rotation.remove_player(id);
        }
        assert_eq!(rotation.player_count(), 0);
        assert_eq!(rotation.current_player_index(), 0);
        assert!(rotation.current_player().is_none());
    }

    #[test]
    fn test_set_current_player_index() {
        let mut rotation = rotation(3);

        assert!(rotation.set_current_player_index(2));
        assert_eq!(rotation.current_player().unwrap().name, "Citra");

        assert!(!rotation.set_current_player_index(3));
        assert_eq!(rotation.current_player_index(), 2);

        rotation.advance_to_next_player();
        assert_eq!(rotation.current_player_index(), 0);
    }

    #[test]
    fn test_persisted_field_names() {
        let json = serde_json::to_value(rotation(2)).unwrap();
        assert_eq!(json["players"][0]["name"], "Ana");
        assert_eq!(json["players"][0]["id"], "player-1-1000");
        assert_eq!(json["currentPlayerIndex"], 0);
    }
}
