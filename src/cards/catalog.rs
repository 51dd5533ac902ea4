//! Content catalog: themes and their card decks.
//!
//! The catalog is read-only data. `Catalog::builtin()` ships the three
//! stock themes; `Catalog::from_json` loads a custom deck set. Both go
//! through the same validation so every theme upholds the bookend rules:
//! at most one opening card, at most one closing card, never both on the
//! same card, and no duplicate card ids.

use std::str::FromStr;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::definition::Card;
use crate::core::{GameError, Result};

/// Theme identifier. The set is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeSlug {
    Family,
    Friends,
    Couples,
}

impl ThemeSlug {
    /// Every theme, in menu order.
    pub const ALL: [ThemeSlug; 3] = [ThemeSlug::Family, ThemeSlug::Friends, ThemeSlug::Couples];

    /// The slug string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ThemeSlug::Family => "family",
            ThemeSlug::Friends => "friends",
            ThemeSlug::Couples => "couples",
        }
    }
}

impl std::fmt::Display for ThemeSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeSlug {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        ThemeSlug::ALL
            .into_iter()
            .find(|slug| slug.as_str() == s)
            .ok_or_else(|| GameError::invalid_catalog(format!("unknown theme slug {s:?}")))
    }
}

/// A theme and its ordered deck.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub slug: ThemeSlug,
    pub name: String,
    pub description: String,
    pub cards: Vec<Card>,
}

impl Theme {
    /// Create an empty theme.
    #[must_use]
    pub fn new(slug: ThemeSlug, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            slug,
            name: name.into(),
            description: description.into(),
            cards: Vec::new(),
        }
    }

    /// Append a card (builder pattern).
    #[must_use]
    pub fn with_card(mut self, card: Card) -> Self {
        self.cards.push(card);
        self
    }

    /// The opening card, if the theme has one.
    #[must_use]
    pub fn opening_card(&self) -> Option<&Card> {
        self.cards.iter().find(|c| c.is_opening)
    }

    /// The closing card, if the theme has one.
    #[must_use]
    pub fn closing_card(&self) -> Option<&Card> {
        self.cards.iter().find(|c| c.is_closing)
    }

    /// Cards that go into the shuffled pool, in catalog order.
    pub fn conversation_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|c| c.is_conversation())
    }

    /// Number of conversation cards.
    #[must_use]
    pub fn conversation_count(&self) -> usize {
        self.conversation_cards().count()
    }

    fn validate(&self) -> Result<()> {
        let mut seen = FxHashSet::default();
        let mut openings = 0;
        let mut closings = 0;

        for card in &self.cards {
            if !seen.insert(&card.id) {
                return Err(GameError::invalid_catalog(format!(
                    "theme {} repeats card id {}",
                    self.slug, card.id
                )));
            }
            if card.is_opening && card.is_closing {
                return Err(GameError::invalid_catalog(format!(
                    "card {} is both opening and closing",
                    card.id
                )));
            }
            openings += usize::from(card.is_opening);
            closings += usize::from(card.is_closing);
        }

        if openings > 1 {
            return Err(GameError::invalid_catalog(format!(
                "theme {} has {openings} opening cards",
                self.slug
            )));
        }
        if closings > 1 {
            return Err(GameError::invalid_catalog(format!(
                "theme {} has {closings} closing cards",
                self.slug
            )));
        }
        Ok(())
    }
}

/// Validated collection of themes.
///
/// ## Example
///
/// ```
/// use obrolan::cards::{Catalog, ThemeSlug};
///
/// let catalog = Catalog::builtin();
/// let family = catalog.theme(ThemeSlug::Family).unwrap();
///
/// assert!(family.opening_card().is_some());
/// assert!(family.closing_card().is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    themes: FxHashMap<ThemeSlug, Theme>,
}

impl Catalog {
    /// Build a catalog, validating every theme.
    ///
    /// A later theme with the same slug replaces an earlier one.
    pub fn from_themes(themes: impl IntoIterator<Item = Theme>) -> Result<Self> {
        let mut map = FxHashMap::default();
        for theme in themes {
            theme.validate()?;
            map.insert(theme.slug, theme);
        }
        Ok(Self { themes: map })
    }

    /// Parse a JSON array of themes.
    pub fn from_json(json: &str) -> Result<Self> {
        let themes: Vec<Theme> = serde_json::from_str(json)
            .map_err(|e| GameError::invalid_catalog(format!("unreadable catalog: {e}")))?;
        Self::from_themes(themes)
    }

    /// The stock themes.
    #[must_use]
    pub fn builtin() -> Self {
        let themes = builtin_themes()
            .into_iter()
            .map(|theme| (theme.slug, theme))
            .collect();
        Self { themes }
    }

    /// Look up a theme.
    #[must_use]
    pub fn theme(&self, slug: ThemeSlug) -> Option<&Theme> {
        self.themes.get(&slug)
    }

    /// Look up a theme, failing with `UnknownTheme`.
    pub fn require(&self, slug: ThemeSlug) -> Result<&Theme> {
        self.theme(slug).ok_or(GameError::UnknownTheme(slug))
    }

    /// Themes in menu order.
    pub fn themes(&self) -> impl Iterator<Item = &Theme> {
        ThemeSlug::ALL.into_iter().filter_map(|slug| self.themes.get(&slug))
    }

    /// Number of themes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.themes.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

fn deck(slug: ThemeSlug, opening: &str, prompts: &[&str], closing: &str) -> Vec<Card> {
    let mut cards = Vec::with_capacity(prompts.len() + 2);
    cards.push(Card::opening(format!("{slug}-opening"), opening));
    cards.extend(
        prompts
            .iter()
            .enumerate()
            .map(|(i, prompt)| Card::new(format!("{slug}-{}", i + 1), *prompt)),
    );
    cards.push(Card::closing(format!("{slug}-closing"), closing));
    cards
}

fn builtin_themes() -> Vec<Theme> {
    vec![
        Theme {
            slug: ThemeSlug::Family,
            name: "Family".to_string(),
            description: "Warm questions for parents, kids and everyone at the dinner table.".to_string(),
            cards: deck(
                ThemeSlug::Family,
                "Everyone gets a turn to speak. Listen without interrupting, and anyone may pass on a question.",
                &[
                    "What is a family tradition you hope we never stop doing?",
                    "Which meal reminds you most of home, and why?",
                    "What is something you learned from a grandparent?",
                    "When did you feel most proud of someone in this family?",
                    "What is a funny story from when you were little?",
                    "If our family had a motto, what would it be?",
                    "What is one thing you wish we did together more often?",
                    "Which family trip would you repeat tomorrow?",
                    "What is a small thing someone here does that makes your day better?",
                    "What do you want to tell your future self about this family?",
                ],
                "Thank you for sharing. Pick one thing you heard tonight and tell that person why it mattered to you.",
            ),
        },
        Theme {
            slug: ThemeSlug::Friends,
            name: "Friends".to_string(),
            description: "Light and deep questions to get to know your friends better.".to_string(),
            cards: deck(
                ThemeSlug::Friends,
                "What is said here stays here. Be honest, be kind, and skip any card you do not want to answer.",
                &[
                    "How did we first meet, from your point of view?",
                    "What is a hobby you would pick up if time were not an issue?",
                    "What is the best advice a friend ever gave you?",
                    "Which song instantly puts you in a good mood?",
                    "What is something you changed your mind about this year?",
                    "What is a small win you have not told anyone about yet?",
                    "If we planned a trip together, where would we go?",
                    "What do you value most in a friendship?",
                    "What is a memory with this group you still laugh about?",
                    "What is one thing you want to try before the year ends?",
                ],
                "Thanks for playing. Before you leave, make a plan for the next time you all meet.",
            ),
        },
        Theme {
            slug: ThemeSlug::Couples,
            name: "Couples".to_string(),
            description: "Questions to reconnect and learn something new about each other.".to_string(),
            cards: deck(
                ThemeSlug::Couples,
                "Put your phones away. Answer honestly and listen with curiosity rather than to reply.",
                &[
                    "What was your first impression of me?",
                    "When do you feel most loved by me?",
                    "What is a dream you have not told me about yet?",
                    "Which moment of ours would you relive?",
                    "What is something I do that you secretly admire?",
                    "How can I support you better this month?",
                    "What does a perfect lazy day together look like?",
                    "What is something new you would like us to try?",
                    "What is a challenge we handled well together?",
                    "Where do you picture us in five years?",
                ],
                "Thank you for opening up. End with one thing you appreciate about each other.",
            ),
        },
    ]
}
