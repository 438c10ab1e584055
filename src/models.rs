//! Record models and domain types for matches and participant statistics.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use serde::Serialize;
use tracing::instrument;

use crate::error::StoreError;
use crate::schema;

/// Winner column value that marks a finished match as a draw.
///
/// Participant identities are opaque non-negative integers supplied by the
/// front-end, so a negative sentinel can never collide with a real one.
pub const DRAW_SENTINEL: i64 = -1;

/// Match lifecycle status.
///
/// Transitions are strictly forward: `Waiting → Active → Finished`, plus the
/// direct `Waiting → Finished` edge used for abandonment. No reverse
/// transitions exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MatchStatus {
    /// Created, no second participant yet.
    Waiting,
    /// Both participants admitted, turns in progress.
    Active,
    /// Terminal outcome recorded.
    Finished,
}

impl MatchStatus {
    /// Converts the status to the string stored in the database.
    #[instrument]
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Finished => "finished",
        }
    }

    /// Parses the status from the string stored in the database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidStatus`] if the string is not a known
    /// lifecycle value.
    #[instrument(skip(s), fields(s = %s))]
    pub fn from_db_string(s: &str) -> Result<Self, StoreError> {
        match s {
            "waiting" => Ok(Self::Waiting),
            "active" => Ok(Self::Active),
            "finished" => Ok(Self::Finished),
            _ => Err(StoreError::InvalidStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// Terminal outcome of a match from one participant's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Participant won the match.
    Win,
    /// Participant lost the match.
    Loss,
    /// Match ended in a draw.
    Draw,
}

/// Terminal-outcome report passed to [`MatchStore::finish`](crate::MatchStore::finish).
///
/// The draw case is an explicit variant rather than an out-of-range winner
/// identity, so an unknown winner can be rejected instead of silently
/// counted as a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// The named participant won; the other (if present) lost.
    Winner(i64),
    /// Neither participant won.
    Draw,
}

impl MatchResult {
    /// Value stored in the `winner` column for this result.
    pub(crate) fn winner_value(&self) -> i64 {
        match self {
            Self::Winner(id) => *id,
            Self::Draw => DRAW_SENTINEL,
        }
    }
}

/// Match record snapshot as persisted in the store.
///
/// `board_state` is an opaque pre-serialized blob; the store never
/// interprets it. Win and draw detection belong to the rendering front-end.
#[derive(Debug, Clone, Queryable, Selectable, Getters, Serialize)]
#[diesel(table_name = schema::matches)]
pub struct MatchRecord {
    match_id: String,
    initiator_id: i64,
    responder_id: Option<i64>,
    initiator_symbol: Option<String>,
    responder_symbol: Option<String>,
    board_state: Option<String>,
    winner: Option<i64>,
    status: String,
    created_at: NaiveDateTime,
}

impl MatchRecord {
    /// Parses the stored status string into a [`MatchStatus`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidStatus`] if the column holds an
    /// unrecognized value.
    #[instrument(skip(self), fields(status = %self.status))]
    pub fn parse_status(&self) -> Result<MatchStatus, StoreError> {
        MatchStatus::from_db_string(&self.status)
    }

    /// Decodes the winner column. `None` while the match is not finished.
    #[instrument(skip(self))]
    pub fn result(&self) -> Option<MatchResult> {
        self.winner.map(|w| {
            if w == DRAW_SENTINEL {
                MatchResult::Draw
            } else {
                MatchResult::Winner(w)
            }
        })
    }
}

/// Insertable match model for freshly created records.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::matches)]
pub(crate) struct NewMatch {
    match_id: String,
    initiator_id: i64,
    status: String,
}

/// Cumulative statistics for one participant.
///
/// Counters are additive only: never deleted, never decremented. The row is
/// created lazily on the participant's first terminal match, so absence
/// means "no finished games yet", not an error.
#[derive(Debug, Clone, Queryable, Selectable, Getters, Serialize)]
#[diesel(table_name = schema::participant_stats)]
pub struct StatsRecord {
    participant_id: i64,
    games_played: i32,
    wins: i32,
    losses: i32,
    draws: i32,
}

impl StatsRecord {
    /// Calculates win rate as a percentage (0.0–100.0).
    #[instrument(skip(self))]
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            (self.wins as f64 / self.games_played as f64) * 100.0
        }
    }
}

/// Insertable stats row carrying the first increment for a participant.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::participant_stats)]
pub(crate) struct NewStatsRecord {
    participant_id: i64,
    games_played: i32,
    wins: i32,
    losses: i32,
    draws: i32,
}

impl NewStatsRecord {
    /// Builds the initial row for a participant's first recorded outcome.
    pub(crate) fn for_outcome(participant_id: i64, outcome: Outcome) -> Self {
        let (wins, losses, draws) = match outcome {
            Outcome::Win => (1, 0, 0),
            Outcome::Loss => (0, 1, 0),
            Outcome::Draw => (0, 0, 1),
        };
        Self {
            participant_id,
            games_played: 1,
            wins,
            losses,
            draws,
        }
    }
}
