//! Session lifecycle: identity, theme, timestamps and phase.
//!
//! A session moves through three phases, each entered exactly once:
//!
//! ```text
//! opening --start_playing--> playing --start_closing--> closing
//! ```
//!
//! `SessionLifecycle` is the only writer of the session record. It does
//! not touch cards or players itself; `initialize_session` hands back the
//! seats and conversation cards for the orchestrator to install.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use time::OffsetDateTime;
use tracing::info;

use crate::cards::{Card, Theme, ThemeSlug};
use crate::core::clock::unix_millis;
use crate::core::{GameError, Result};
use crate::players::Player;

/// Coarse stage of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Opening card on screen, nothing drawn yet.
    #[default]
    Opening,
    /// Players take turns picking table cards.
    Playing,
    /// Closing card on screen. Terminal.
    Closing,
}

impl Phase {
    /// The only phase this one may move to.
    #[must_use]
    pub const fn next(self) -> Option<Phase> {
        match self {
            Phase::Opening => Some(Phase::Playing),
            Phase::Playing => Some(Phase::Closing),
            Phase::Closing => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Opening => "opening",
            Phase::Playing => "playing",
            Phase::Closing => "closing",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted description of the active session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// `session-{created_millis}`.
    pub session_id: String,

    pub theme: ThemeSlug,

    pub phase: Phase,

    /// Set once, when play starts.
    pub opening_shown: bool,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,

    /// Absent when the theme has no opening card.
    pub opening_card: Option<Card>,

    /// Absent when the theme has no closing card.
    pub closing_card: Option<Card>,
}

impl SessionRecord {
    /// Session id for a session created at `now`.
    #[must_use]
    pub fn id_for(now: OffsetDateTime) -> String {
        format!("session-{}", unix_millis(now))
    }
}

/// Seats and shuffled-pool input produced by `initialize_session`.
#[derive(Clone, Debug)]
pub struct SessionStart {
    pub players: SmallVec<[Player; 4]>,
    pub conversation_cards: Vec<Card>,
}

/// Owns the session record.
///
/// ## Example
///
/// ```
/// use obrolan::cards::{Catalog, ThemeSlug};
/// use obrolan::session::{Phase, SessionLifecycle};
/// use time::OffsetDateTime;
///
/// let catalog = Catalog::builtin();
/// let theme = catalog.require(ThemeSlug::Friends).unwrap();
/// let now = OffsetDateTime::now_utc();
///
/// let mut session = SessionLifecycle::new();
/// session.initialize_session(theme, &["Ana", "Budi"], now).unwrap();
/// assert_eq!(session.phase(), Some(Phase::Opening));
///
/// session.start_playing(now).unwrap();
/// assert!(session.start_playing(now).is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionLifecycle {
    current: Option<SessionRecord>,
}

impl SessionLifecycle {
    /// No session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a rehydrated record.
    #[must_use]
    pub fn from_record(record: Option<SessionRecord>) -> Self {
        Self { current: record }
    }

    /// Start a fresh session in the opening phase.
    ///
    /// Blank names are dropped after trimming; fewer than two remaining
    /// fails with `InvalidSetup`. Any previous record is replaced.
    pub fn initialize_session<S: AsRef<str>>(
        &mut self,
        theme: &Theme,
        player_names: &[S],
        now: OffsetDateTime,
    ) -> Result<SessionStart> {
        let names: Vec<&str> = player_names
            .iter()
            .map(|n| n.as_ref().trim())
            .filter(|n| !n.is_empty())
            .collect();
        if names.len() < 2 {
            return Err(GameError::invalid_setup(format!(
                "need at least 2 named players, got {}",
                names.len()
            )));
        }

        let record = SessionRecord {
            session_id: SessionRecord::id_for(now),
            theme: theme.slug,
            phase: Phase::Opening,
            opening_shown: false,
            created_at: now,
            updated_at: now,
            opening_card: theme.opening_card().cloned(),
            closing_card: theme.closing_card().cloned(),
        };
        info!(session = %record.session_id, theme = %theme.slug, players = names.len(), "session initialized");
        self.current = Some(record);

        Ok(SessionStart {
            players: Player::seat_all(names, unix_millis(now)),
            conversation_cards: theme.conversation_cards().cloned().collect(),
        })
    }

    /// opening -> playing. Marks the opening card as shown.
    pub fn start_playing(&mut self, now: OffsetDateTime) -> Result<()> {
        let record = self.advance(Phase::Playing, now)?;
        record.opening_shown = true;
        Ok(())
    }

    /// playing -> closing.
    pub fn start_closing(&mut self, now: OffsetDateTime) -> Result<()> {
        self.advance(Phase::Closing, now).map(|_| ())
    }

    /// Forget the session.
    pub fn clear_session(&mut self) {
        if let Some(record) = self.current.take() {
            info!(session = %record.session_id, phase = %record.phase, "session cleared");
        }
    }

    /// Bump `updated_at`.
    pub fn touch(&mut self, now: OffsetDateTime) {
        if let Some(record) = self.current.as_mut() {
            record.updated_at = now;
        }
    }

    fn advance(&mut self, to: Phase, now: OffsetDateTime) -> Result<&mut SessionRecord> {
        let record = self.current.as_mut().ok_or(GameError::NoActiveSession)?;
        if record.phase.next() != Some(to) {
            return Err(GameError::InvalidTransition { from: record.phase, to });
        }

        info!(session = %record.session_id, from = %record.phase, %to, "phase change");
        record.phase = to;
        record.updated_at = now;
        Ok(record)
    }

    // === Getters ===

    #[must_use]
    pub fn record(&self) -> Option<&SessionRecord> {
        self.current.as_ref()
    }

    /// True while a session exists.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.current.as_ref().map(|r| r.session_id.as_str())
    }

    #[must_use]
    pub fn theme(&self) -> Option<ThemeSlug> {
        self.current.as_ref().map(|r| r.theme)
    }

    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        self.current.as_ref().map(|r| r.phase)
    }

    #[must_use]
    pub fn is_in_playing_phase(&self) -> bool {
        self.phase() == Some(Phase::Playing)
    }

    /// Opening phase and the opening card not yet dismissed.
    #[must_use]
    pub fn should_show_opening(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|r| r.phase == Phase::Opening && !r.opening_shown)
    }

    #[must_use]
    pub fn should_show_closing(&self) -> bool {
        self.phase() == Some(Phase::Closing)
    }
}
