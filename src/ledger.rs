//! Cumulative per-participant statistics ledger.

use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::conn;
use crate::error::StoreError;
use crate::models::{NewStatsRecord, Outcome, StatsRecord};
use crate::schema;

/// Ledger of cumulative win/loss/draw counters, keyed by participant.
///
/// Updated as a side effect of a match reaching a terminal state. The
/// ledger applies every call it receives; exactly-once accounting is
/// enforced upstream by [`MatchStore::finish`](crate::MatchStore::finish),
/// which performs at most one ledger update per participant per match.
#[derive(Debug, Clone)]
pub struct StatsLedger {
    db_path: String,
}

impl StatsLedger {
    /// Creates a ledger handle over the database at the given path.
    ///
    /// The schema must already exist; [`MatchStore::open`](crate::MatchStore::open)
    /// applies it and hands out a ready ledger via
    /// [`MatchStore::ledger`](crate::MatchStore::ledger).
    #[instrument(skip(db_path))]
    pub fn new(db_path: impl Into<String>) -> Self {
        let db_path = db_path.into();
        debug!(path = %db_path, "Creating StatsLedger");
        Self { db_path }
    }

    /// Records one terminal outcome for a participant.
    ///
    /// Creates the participant's row with all counters zero if absent, then
    /// increments the matching counter and `games_played` by one, as a
    /// single upsert statement. Calls for different participants are
    /// independent and commutative.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn record_result(
        &self,
        participant_id: i64,
        outcome: Outcome,
    ) -> Result<(), StoreError> {
        let mut conn = conn::establish(&self.db_path)?;
        Self::record_on(&mut conn, participant_id, outcome)
    }

    /// Applies one outcome increment on an existing connection.
    ///
    /// Used by the match store to keep the ledger update inside the same
    /// transaction as the status transition that gates it.
    pub(crate) fn record_on(
        conn: &mut SqliteConnection,
        participant_id: i64,
        outcome: Outcome,
    ) -> Result<(), StoreError> {
        use schema::participant_stats::dsl;

        debug!(participant_id, ?outcome, "Recording result");
        let row = NewStatsRecord::for_outcome(participant_id, outcome);
        let insert = diesel::insert_into(dsl::participant_stats)
            .values(&row)
            .on_conflict(dsl::participant_id);

        match outcome {
            Outcome::Win => insert
                .do_update()
                .set((
                    dsl::games_played.eq(dsl::games_played + 1),
                    dsl::wins.eq(dsl::wins + 1),
                ))
                .execute(conn)?,
            Outcome::Loss => insert
                .do_update()
                .set((
                    dsl::games_played.eq(dsl::games_played + 1),
                    dsl::losses.eq(dsl::losses + 1),
                ))
                .execute(conn)?,
            Outcome::Draw => insert
                .do_update()
                .set((
                    dsl::games_played.eq(dsl::games_played + 1),
                    dsl::draws.eq(dsl::draws + 1),
                ))
                .execute(conn)?,
        };

        info!(participant_id, ?outcome, "Result recorded");
        Ok(())
    }

    /// Gets the cumulative counters for a participant.
    ///
    /// Returns `None` for participants with no finished matches yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get(&self, participant_id: i64) -> Result<Option<StatsRecord>, StoreError> {
        use schema::participant_stats::dsl;

        debug!(participant_id, "Loading participant stats");
        let mut conn = conn::establish(&self.db_path)?;

        let record = dsl::participant_stats
            .filter(dsl::participant_id.eq(participant_id))
            .select(StatsRecord::as_select())
            .first::<StatsRecord>(&mut conn)
            .optional()?;

        if let Some(ref stats) = record {
            debug!(
                participant_id,
                games_played = stats.games_played(),
                "Stats found"
            );
        } else {
            debug!(participant_id, "No stats recorded yet");
        }

        Ok(record)
    }
}
