//! Store and ledger error types.

use derive_more::{Display, Error, From};

/// Error returned by [`MatchStore`](crate::MatchStore) and
/// [`StatsLedger`](crate::StatsLedger) operations.
///
/// All variants are local and recoverable by the caller; none warrant a
/// process crash. A rejected join is not an error at all — it is the
/// routine `Ok(false)` result of [`MatchStore::join`](crate::MatchStore::join).
#[derive(Debug, Display, Error, From)]
pub enum StoreError {
    /// The referenced match record does not exist.
    #[display("match '{match_id}' not found")]
    NotFound {
        /// Identifier the operation was called with.
        match_id: String,
    },

    /// `finish` was called on a record that is already terminal.
    #[display("match '{match_id}' is already finished")]
    AlreadyFinished {
        /// Identifier of the finished match.
        match_id: String,
    },

    /// The identifier space produced collisions on every allocation attempt.
    ///
    /// Practically unreachable with a six-digit space; treated as a fatal
    /// configuration problem rather than a routine condition.
    #[display("match identifier space exhausted after {attempts} attempts")]
    AllocationExhausted {
        /// Number of random draws that all collided.
        attempts: u32,
    },

    /// A terminal-outcome report named a winner that is neither participant.
    #[display("winner {winner} is not a participant of match '{match_id}'")]
    UnknownWinner {
        /// Identifier of the match being finished.
        match_id: String,
        /// The rejected winner identity.
        winner: i64,
    },

    /// A stored status column held a value outside the known lifecycle.
    #[display("invalid match status '{value}'")]
    InvalidStatus {
        /// The unrecognized stored value.
        value: String,
    },

    /// Applying embedded migrations failed.
    #[display("migration failed: {message}")]
    Migration {
        /// Underlying migration harness message.
        message: String,
    },

    /// Establishing a database connection failed.
    #[display("database connection failed: {_0}")]
    #[from]
    Connection(#[error(source)] diesel::ConnectionError),

    /// Executing a query failed.
    #[display("database query failed: {_0}")]
    #[from]
    Query(#[error(source)] diesel::result::Error),
}
