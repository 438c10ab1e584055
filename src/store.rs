//! Match record store: creation, admission, board persistence, termination.

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::conn;
use crate::error::StoreError;
use crate::ledger::StatsLedger;
use crate::models::{MatchRecord, MatchResult, MatchStatus, NewMatch, Outcome};
use crate::schema;

/// Embedded schema migrations, applied by [`MatchStore::open`].
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Length of allocated match identifiers; 10^6 combinations.
const MATCH_ID_LEN: usize = 6;

/// Random draws before `create` gives up with `AllocationExhausted`.
const MAX_ID_ATTEMPTS: u32 = 16;

/// Store of two-player match records.
///
/// Owns the match lifecycle (`waiting → active → finished`) and the board
/// snapshot, and drives the [`StatsLedger`] exactly once per terminal
/// match. Safe under arbitrary concurrent callers: every mutating
/// operation embeds its precondition in a single SQL statement, so there
/// is no observable intermediate state to race against.
#[derive(Debug, Clone)]
pub struct MatchStore {
    db_path: String,
    ledger: StatsLedger,
}

impl MatchStore {
    /// Opens the store at the given path, applying pending migrations.
    ///
    /// Use `":memory:"` only for throwaway experiments; per-operation
    /// connections mean an in-memory database does not survive between
    /// calls, so tests use a temporary file instead.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path))]
    pub fn open(db_path: impl Into<String>) -> Result<Self, StoreError> {
        let db_path = db_path.into();
        info!(path = %db_path, "Opening match store");

        let mut conn = conn::establish(&db_path)?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::Migration {
                message: e.to_string(),
            })?;

        let ledger = StatsLedger::new(db_path.clone());
        Ok(Self { db_path, ledger })
    }

    /// The stats ledger backed by the same database.
    pub fn ledger(&self) -> &StatsLedger {
        &self.ledger
    }

    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        conn::establish(&self.db_path)
    }

    /// Creates a new match in `waiting` state and returns its identifier.
    ///
    /// Identifiers are fixed-length numeric strings drawn uniformly at
    /// random; a collision with an existing record surfaces as a unique
    /// constraint violation on insert and triggers a redraw.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AllocationExhausted`] if every draw collided,
    /// which indicates a saturated identifier space rather than bad luck.
    #[instrument(skip(self))]
    pub fn create(&self, initiator_id: i64) -> Result<String, StoreError> {
        let mut conn = self.connection()?;
        let mut rng = rand::thread_rng();

        for attempt in 1..=MAX_ID_ATTEMPTS {
            let match_id = allocate_id(&mut rng);
            let new_match = NewMatch::new(
                match_id.clone(),
                initiator_id,
                MatchStatus::Waiting.to_db_string().to_string(),
            );

            match diesel::insert_into(schema::matches::table)
                .values(&new_match)
                .execute(&mut conn)
            {
                Ok(_) => {
                    info!(match_id = %match_id, initiator_id, "Match created");
                    return Ok(match_id);
                }
                Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                    debug!(match_id = %match_id, attempt, "Identifier collision, redrawing");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(attempts = MAX_ID_ATTEMPTS, "Identifier space exhausted");
        Err(StoreError::AllocationExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    /// Admits a second participant, flipping the match to `active`.
    ///
    /// The admission is one conditional update: it succeeds only if the
    /// record exists, is still `waiting`, and has no responder. Under
    /// concurrent join attempts exactly one caller observes `true`; the
    /// rest get `false` with no mutation. `false` also covers a missing,
    /// already-active, or finished match — a lost race is routine, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only if a database error occurs.
    #[instrument(skip(self))]
    pub fn join(&self, match_id: &str, responder_id: i64) -> Result<bool, StoreError> {
        use schema::matches::dsl;

        let mut conn = self.connection()?;
        let updated = diesel::update(
            dsl::matches
                .filter(dsl::match_id.eq(match_id))
                .filter(dsl::status.eq(MatchStatus::Waiting.to_db_string()))
                .filter(dsl::responder_id.is_null()),
        )
        .set((
            dsl::responder_id.eq(Some(responder_id)),
            dsl::status.eq(MatchStatus::Active.to_db_string()),
        ))
        .execute(&mut conn)?;

        if updated > 0 {
            info!(match_id = %match_id, responder_id, "Responder admitted");
        } else {
            debug!(match_id = %match_id, responder_id, "Join rejected");
        }
        Ok(updated > 0)
    }

    /// Overwrites the stored board snapshot for an existing match.
    ///
    /// The blob is opaque to the store and is replaced unconditionally
    /// regardless of status; callers supply state computed after their own
    /// turn, and no ordering is enforced here.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the record does not exist.
    #[instrument(skip(self, board_state))]
    pub fn update_board(&self, match_id: &str, board_state: &str) -> Result<(), StoreError> {
        use schema::matches::dsl;

        let mut conn = self.connection()?;
        let updated = diesel::update(dsl::matches.filter(dsl::match_id.eq(match_id)))
            .set(dsl::board_state.eq(Some(board_state)))
            .execute(&mut conn)?;

        if updated == 0 {
            return Err(StoreError::NotFound {
                match_id: match_id.to_string(),
            });
        }
        debug!(match_id = %match_id, "Board snapshot stored");
        Ok(())
    }

    /// Assigns the single-character markers for both participants.
    ///
    /// Assignment timing is the front-end's policy; the store only keeps
    /// the markers alongside the record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the record does not exist.
    #[instrument(skip(self))]
    pub fn set_symbols(
        &self,
        match_id: &str,
        initiator_symbol: char,
        responder_symbol: char,
    ) -> Result<(), StoreError> {
        use schema::matches::dsl;

        let mut conn = self.connection()?;
        let updated = diesel::update(dsl::matches.filter(dsl::match_id.eq(match_id)))
            .set((
                dsl::initiator_symbol.eq(Some(initiator_symbol.to_string())),
                dsl::responder_symbol.eq(Some(responder_symbol.to_string())),
            ))
            .execute(&mut conn)?;

        if updated == 0 {
            return Err(StoreError::NotFound {
                match_id: match_id.to_string(),
            });
        }
        debug!(match_id = %match_id, "Symbols assigned");
        Ok(())
    }

    /// Records the terminal outcome and updates the stats ledger.
    ///
    /// The status flip and the ledger increments run in one transaction:
    /// the flip is a conditional update guarded on `status != finished`,
    /// and each present participant receives exactly one ledger update
    /// (win/loss pairing, or draw for both). A `waiting` match may be
    /// finished directly — abandonment — in which case only the initiator
    /// is accounted.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if the record does not exist.
    /// - [`StoreError::AlreadyFinished`] on a second call for the same
    ///   match; the ledger is untouched, preserving exactly-once counting.
    /// - [`StoreError::UnknownWinner`] if the reported winner is neither
    ///   participant; the transaction rolls back and nothing changes.
    #[instrument(skip(self))]
    pub fn finish(&self, match_id: &str, result: MatchResult) -> Result<(), StoreError> {
        use schema::matches::dsl;

        let mut conn = self.connection()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            let updated = diesel::update(
                dsl::matches
                    .filter(dsl::match_id.eq(match_id))
                    .filter(dsl::status.ne(MatchStatus::Finished.to_db_string())),
            )
            .set((
                dsl::winner.eq(Some(result.winner_value())),
                dsl::status.eq(MatchStatus::Finished.to_db_string()),
            ))
            .execute(conn)?;

            if updated == 0 {
                let existing = dsl::matches
                    .filter(dsl::match_id.eq(match_id))
                    .select(MatchRecord::as_select())
                    .first::<MatchRecord>(conn)
                    .optional()?;
                return Err(match existing {
                    Some(_) => StoreError::AlreadyFinished {
                        match_id: match_id.to_string(),
                    },
                    None => StoreError::NotFound {
                        match_id: match_id.to_string(),
                    },
                });
            }

            let record = dsl::matches
                .filter(dsl::match_id.eq(match_id))
                .select(MatchRecord::as_select())
                .first::<MatchRecord>(conn)?;

            let initiator = *record.initiator_id();
            let responder = *record.responder_id();

            match result {
                MatchResult::Draw => {
                    StatsLedger::record_on(conn, initiator, Outcome::Draw)?;
                    if let Some(responder) = responder {
                        StatsLedger::record_on(conn, responder, Outcome::Draw)?;
                    }
                }
                MatchResult::Winner(winner) if winner == initiator => {
                    StatsLedger::record_on(conn, initiator, Outcome::Win)?;
                    if let Some(responder) = responder {
                        StatsLedger::record_on(conn, responder, Outcome::Loss)?;
                    }
                }
                MatchResult::Winner(winner) if Some(winner) == responder => {
                    StatsLedger::record_on(conn, winner, Outcome::Win)?;
                    StatsLedger::record_on(conn, initiator, Outcome::Loss)?;
                }
                MatchResult::Winner(winner) => {
                    // Rolls back the status flip above.
                    return Err(StoreError::UnknownWinner {
                        match_id: match_id.to_string(),
                        winner,
                    });
                }
            }

            info!(match_id = %match_id, ?result, "Match finished");
            Ok(())
        })
    }

    /// Gets a read-only snapshot of a match record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get(&self, match_id: &str) -> Result<Option<MatchRecord>, StoreError> {
        use schema::matches::dsl;

        let mut conn = self.connection()?;
        let record = dsl::matches
            .filter(dsl::match_id.eq(match_id))
            .select(MatchRecord::as_select())
            .first::<MatchRecord>(&mut conn)
            .optional()?;

        if record.is_some() {
            debug!(match_id = %match_id, "Match found");
        } else {
            debug!(match_id = %match_id, "Match not found");
        }
        Ok(record)
    }
}

/// Draws a fixed-length numeric identifier uniformly at random.
fn allocate_id(rng: &mut impl Rng) -> String {
    (0..MATCH_ID_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
