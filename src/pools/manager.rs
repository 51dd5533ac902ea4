//! Card pool manager: stack, table, closed, and the current selection.
//!
//! `CardPools` tracks where each conversation card of a session is and
//! moves cards between pools. It supports:
//! - One shuffle per session, onto the stack
//! - Drawing from the front of the stack onto the end of the table
//! - A one-card selection lock per turn
//! - Resolving the selection into the closed pile
//!
//! Pools use `im::Vector` so a render snapshot is an O(1) clone.

use im::Vector;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cards::{Card, CardId};
use crate::core::GameRng;

/// Which pool a card is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pool {
    /// Undrawn, in draw order.
    Stack,
    /// Visible and selectable.
    Table,
    /// Played and resolved.
    Closed,
}

/// A broken pool invariant, found when checking rehydrated state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolViolation {
    /// The same card identity appears twice across the pools.
    Duplicate(CardId),
    /// The selected card is not on the table.
    SelectionOffTable(CardId),
}

impl std::fmt::Display for PoolViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolViolation::Duplicate(id) => write!(f, "card {id} appears in more than one place"),
            PoolViolation::SelectionOffTable(id) => write!(f, "selected card {id} is not on the table"),
        }
    }
}

/// Owns the three card pools of the active session.
///
/// ## Usage
///
/// ```
/// use obrolan::cards::Card;
/// use obrolan::core::GameRng;
/// use obrolan::pools::CardPools;
///
/// let mut pools = CardPools::new();
/// let cards = (1..=3).map(|i| Card::new(format!("c{i}"), "?"));
/// pools.initialize_cards(cards, &mut GameRng::new(1));
///
/// pools.draw_cards_to_table(2);
/// let first = pools.table()[0].id.clone();
/// assert!(pools.select_card(&first));
///
/// pools.move_selected_card_to_closed();
/// assert_eq!(pools.closed_count(), 1);
/// assert_eq!(pools.table_count(), 1);
/// assert_eq!(pools.stack_count(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPools {
    /// Undrawn cards; the front is drawn first.
    #[serde(rename = "cardsOnStack")]
    stack: Vector<Card>,

    /// Cards players can pick from.
    #[serde(rename = "cardsOnDeck")]
    table: Vector<Card>,

    /// Cards already played.
    #[serde(rename = "closedCards")]
    closed: Vector<Card>,

    /// This turn's pick. Always a member of `table`.
    #[serde(rename = "selectedCard")]
    selected: Option<Card>,
}

impl CardPools {
    /// Create empty pools.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shuffle `cards` onto the stack and clear everything else.
    pub fn initialize_cards(&mut self, cards: impl IntoIterator<Item = Card>, rng: &mut GameRng) {
        let mut deck: Vec<Card> = cards.into_iter().collect();
        rng.shuffle(&mut deck);
        debug!(cards = deck.len(), seed = rng.seed(), "shuffled stack");

        self.stack = deck.into_iter().collect();
        self.table.clear();
        self.closed.clear();
        self.selected = None;
    }

    /// Empty every pool.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Move the first `count` stack cards onto the end of the table.
    ///
    /// Draws whatever is left when the stack is short. Returns the cards
    /// that moved, in draw order.
    pub fn draw_cards_to_table(&mut self, count: usize) -> Vec<Card> {
        let n = count.min(self.stack.len());
        if n == 0 {
            return Vec::new();
        }

        let rest = self.stack.split_off(n);
        let drawn = std::mem::replace(&mut self.stack, rest);
        self.table.append(drawn.clone());

        debug!(requested = count, drawn = n, remaining = self.stack.len(), "drew cards to table");
        drawn.into_iter().collect()
    }

    /// Select a table card for this turn.
    ///
    /// Does nothing if a card is already selected or `id` is not on the
    /// table. Returns whether the selection took.
    pub fn select_card(&mut self, id: &CardId) -> bool {
        if self.selected.is_some() {
            return false;
        }
        let Some(card) = self.table.iter().find(|c| &c.id == id) else {
            return false;
        };

        debug!(card = %id, "selected card");
        self.selected = Some(card.clone());
        true
    }

    /// Drop the current selection without resolving it.
    pub fn deselect_card(&mut self) -> Option<Card> {
        self.selected.take()
    }

    /// Resolve the selection: table -> closed.
    ///
    /// The only way a card leaves the table. Returns the closed card, or
    /// `None` when nothing was selected.
    pub fn move_selected_card_to_closed(&mut self) -> Option<Card> {
        let card = self.selected.take()?;
        self.table.retain(|c| c.id != card.id);
        self.closed.push_back(card.clone());

        debug!(card = %card.id, closed = self.closed.len(), "closed card");
        Some(card)
    }

    // === Accessors ===

    /// Undrawn cards in draw order.
    #[must_use]
    pub fn stack(&self) -> &Vector<Card> {
        &self.stack
    }

    /// Cards on the table.
    #[must_use]
    pub fn table(&self) -> &Vector<Card> {
        &self.table
    }

    /// Played cards, oldest first.
    #[must_use]
    pub fn closed(&self) -> &Vector<Card> {
        &self.closed
    }

    /// The current selection.
    #[must_use]
    pub fn selected(&self) -> Option<&Card> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn stack_count(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn table_count(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn closed_count(&self) -> usize {
        self.closed.len()
    }

    /// Cards across all three pools.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.stack.len() + self.table.len() + self.closed.len()
    }

    #[must_use]
    pub fn has_selected_card(&self) -> bool {
        self.selected.is_some()
    }

    #[must_use]
    pub fn is_stack_empty(&self) -> bool {
        self.stack.is_empty()
    }

    #[must_use]
    pub fn is_table_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Check if the stack holds at least `count` cards.
    #[must_use]
    pub fn can_draw_cards(&self, count: usize) -> bool {
        self.stack.len() >= count
    }

    /// No more draws possible and at most one card left to talk about.
    ///
    /// An empty table also counts: a deck with fewer cards than it takes to
    /// refill the table can otherwise run dry without ever leaving exactly
    /// one card, and play would never close.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.stack.is_empty() && self.table.len() <= 1
    }

    /// Find which pool holds a card.
    #[must_use]
    pub fn location(&self, id: &CardId) -> Option<Pool> {
        let holds = |pool: &Vector<Card>| pool.iter().any(|c| &c.id == id);
        if holds(&self.stack) {
            Some(Pool::Stack)
        } else if holds(&self.table) {
            Some(Pool::Table)
        } else if holds(&self.closed) {
            Some(Pool::Closed)
        } else {
            None
        }
    }

    /// Whether any pool holds the card.
    #[must_use]
    pub fn contains(&self, id: &CardId) -> bool {
        self.location(id).is_some()
    }

    /// Check disjointness and the selection invariant.
    #[must_use]
    pub fn find_violation(&self) -> Option<PoolViolation> {
        let mut seen = FxHashSet::default();
        for card in self.stack.iter().chain(self.table.iter()).chain(self.closed.iter()) {
            if !seen.insert(&card.id) {
                return Some(PoolViolation::Duplicate(card.id.clone()));
            }
        }

        match &self.selected {
            Some(sel) if !self.table.iter().any(|c| c.id == sel.id) => {
                Some(PoolViolation::SelectionOffTable(sel.id.clone()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(n: usize) -> Vec<Card> {
        (1..=n).map(|i| Card::new(format!("c{i}"), format!("prompt {i}"))).collect()
    }

    fn seeded(n: usize) -> CardPools {
        let mut pools = CardPools::new();
        pools.initialize_cards(cards(n), &mut GameRng::new(42));
        pools
    }

    fn ids(pool: &Vector<Card>) -> Vec<String> {
        pool.iter().map(|c| c.id.0.clone()).collect()
    }

    #[test]
    fn test_initialize_shuffles_onto_stack() {
        let pools = seeded(20);

        assert_eq!(pools.stack_count(), 20);
        assert!(pools.is_table_empty());
        assert_eq!(pools.closed_count(), 0);
        assert!(!pools.has_selected_card());

        let mut got = ids(pools.stack());
        let before = got.clone();
        got.sort();
        let mut expected = ids(&cards(20).into_iter().collect());
        expected.sort();
        assert_eq!(got, expected);
        assert_ne!(before, ids(&cards(20).into_iter().collect()));
    }

    #[test]
    fn test_initialize_clears_previous_session() {
        let mut pools = seeded(5);
        pools.draw_cards_to_table(2);
        let first = pools.table()[0].id.clone();
        pools.select_card(&first);
        pools.move_selected_card_to_closed();

        pools.initialize_cards(cards(3), &mut GameRng::new(1));

        assert_eq!(pools.stack_count(), 3);
        assert_eq!(pools.table_count(), 0);
        assert_eq!(pools.closed_count(), 0);
        assert!(pools.selected().is_none());
    }

    #[test]
    fn test_draw_takes_from_front_in_order() {
        let mut pools = seeded(6);
        let front: Vec<_> = ids(pools.stack()).into_iter().take(2).collect();

        let drawn = pools.draw_cards_to_table(2);

        assert_eq!(drawn.iter().map(|c| c.id.0.clone()).collect::<Vec<_>>(), front);
        assert_eq!(ids(pools.table()), front);
        assert_eq!(pools.stack_count(), 4);

        // Next draw appends to the end of the table.
        let next = pools.draw_cards_to_table(1);
        assert_eq!(pools.table().back().unwrap().id, next[0].id);
    }

    #[test]
    fn test_draw_more_than_available() {
        let mut pools = seeded(2);

        let drawn = pools.draw_cards_to_table(4);

        assert_eq!(drawn.len(), 2);
        assert!(pools.is_stack_empty());
        assert_eq!(pools.table_count(), 2);
        assert!(pools.draw_cards_to_table(1).is_empty());
    }

    #[test]
    fn test_draw_zero_is_noop() {
        let mut pools = seeded(3);
        let before = pools.clone();

        assert!(pools.draw_cards_to_table(0).is_empty());
        assert_eq!(pools, before);
    }

    #[test]
    fn test_selection_lock() {
        let mut pools = seeded(4);
        pools.draw_cards_to_table(2);
        let a = pools.table()[0].id.clone();
        let b = pools.table()[1].id.clone();

        assert!(pools.select_card(&a));
        assert!(!pools.select_card(&b));
        assert_eq!(pools.selected().unwrap().id, a);
    }

    #[test]
    fn test_select_requires_table_card() {
        let mut pools = seeded(4);
        pools.draw_cards_to_table(1);
        let on_stack = pools.stack()[0].id.clone();

        assert!(!pools.select_card(&on_stack));
        assert!(!pools.select_card(&CardId::new("nope")));
        assert!(!pools.has_selected_card());
    }

    #[test]
    fn test_deselect_releases_lock() {
        let mut pools = seeded(4);
        pools.draw_cards_to_table(2);
        let a = pools.table()[0].id.clone();
        let b = pools.table()[1].id.clone();

        pools.select_card(&a);
        assert_eq!(pools.deselect_card().unwrap().id, a);
        assert!(pools.select_card(&b));
    }

    #[test]
    fn test_move_selected_to_closed() {
        let mut pools = seeded(4);
        pools.draw_cards_to_table(2);
        let a = pools.table()[0].id.clone();
        pools.select_card(&a);

        let closed = pools.move_selected_card_to_closed().unwrap();

        assert_eq!(closed.id, a);
        assert_eq!(pools.location(&a), Some(Pool::Closed));
        assert_eq!(pools.table_count(), 1);
        assert!(pools.selected().is_none());
    }

    #[test]
    fn test_move_without_selection_is_noop() {
        let mut pools = seeded(4);
        pools.draw_cards_to_table(2);
        let before = pools.clone();

        assert!(pools.move_selected_card_to_closed().is_none());
        assert_eq!(pools, before);
    }

    #[test]
    fn test_exhausted() {
        let mut pools = seeded(2);
        assert!(!pools.is_exhausted());

        pools.draw_cards_to_table(2);
        assert!(!pools.is_exhausted());

        let a = pools.table()[0].id.clone();
        pools.select_card(&a);
        pools.move_selected_card_to_closed();
        assert!(pools.is_exhausted());
    }

    #[test]
    fn test_exhausted_with_empty_table() {
        let mut pools = seeded(0);
        pools.draw_cards_to_table(2);
        assert!(pools.is_table_empty());
        assert!(pools.is_exhausted());
    }

    #[test]
    fn test_can_draw_cards() {
        let pools = seeded(3);
        assert!(pools.can_draw_cards(3));
        assert!(!pools.can_draw_cards(4));
    }

    #[test]
    fn test_location() {
        let mut pools = seeded(3);
        pools.draw_cards_to_table(1);
        let on_table = pools.table()[0].id.clone();
        let on_stack = pools.stack()[0].id.clone();

        assert_eq!(pools.location(&on_table), Some(Pool::Table));
        assert_eq!(pools.location(&on_stack), Some(Pool::Stack));
        assert_eq!(pools.location(&CardId::new("x")), None);
        assert!(pools.contains(&on_stack));
        assert!(!pools.contains(&CardId::new("x")));
    }

    #[test]
    fn test_find_violation() {
        let mut pools = seeded(3);
        pools.draw_cards_to_table(2);
        assert_eq!(pools.find_violation(), None);

        let dup = pools.table()[0].clone();
        pools.stack.push_back(dup.clone());
        assert_eq!(pools.find_violation(), Some(PoolViolation::Duplicate(dup.id.clone())));

        let mut pools = seeded(3);
        pools.selected = Some(pools.stack[0].clone());
        assert!(matches!(pools.find_violation(), Some(PoolViolation::SelectionOffTable(_))));
    }

    #[test]
    fn test_reset() {
        let mut pools = seeded(3);
        pools.draw_cards_to_table(1);
        pools.reset();
        assert_eq!(pools, CardPools::new());
    }

    #[test]
    fn test_persisted_field_names() {
        let pools = seeded(1);
        let json = serde_json::to_value(&pools).unwrap();

        assert_eq!(json["cardsOnStack"].as_array().unwrap().len(), 1);
        assert!(json["cardsOnDeck"].as_array().unwrap().is_empty());
        assert!(json["closedCards"].as_array().unwrap().is_empty());
        assert!(json["selectedCard"].is_null());
    }
}
