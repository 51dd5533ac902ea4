//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::rc::Rc;
use std::sync::Once;

use obrolan::{Card, Catalog, Game, GameBuilder, ManualClock, Storage, Theme, ThemeSlug};
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a test subscriber once.
///
/// Level comes from `TEST_LOG`, then `RUST_LOG`, else `warn`.
pub fn init_logging() {
    INIT.call_once(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

pub const START_MILLIS: i64 = 1_700_000_000_000;

/// Family theme with one opening, one closing and `n` conversation cards.
pub fn catalog_with(n: usize) -> Catalog {
    let mut theme = Theme::new(ThemeSlug::Family, "Family", "fixture")
        .with_card(Card::opening("family-opening", "House rules"));
    for i in 1..=n {
        theme = theme.with_card(Card::new(format!("family-{i}"), format!("Question {i}")));
    }
    theme = theme.with_card(Card::closing("family-closing", "Thank you"));
    Catalog::from_themes([theme]).expect("fixture catalog is valid")
}

/// Build a game on `storage` with a shared manual clock.
pub fn build_game<S: Storage>(storage: S, catalog: Catalog, clock: &Rc<ManualClock>) -> Game<S> {
    init_logging();
    GameBuilder::new()
        .catalog(catalog)
        .clock(Rc::clone(clock))
        .seed(42)
        .build(storage)
        .expect("rehydration only fails on I/O")
}

pub fn clock() -> Rc<ManualClock> {
    Rc::new(ManualClock::at_millis(START_MILLIS))
}

/// Pick the first table card and end the turn.
pub fn play_first_card<S: Storage>(game: &mut Game<S>) -> obrolan::TurnOutcome {
    let id = game.view().table[0].id.clone();
    assert!(game.select_card(&id).unwrap());
    game.end_turn().unwrap().expect("a card was selected")
}
