//! Versus - lifecycle store and stats ledger for two-player matches
//!
//! This library coordinates short-lived turn-based matches between two
//! participants: it allocates match identifiers, admits a second player,
//! persists board state across turns, resolves terminal outcomes, and keeps
//! cumulative per-player statistics.
//!
//! # Architecture
//!
//! - **[`MatchStore`]**: owns match records and the `waiting → active →
//!   finished` lifecycle; every mutating operation is a single conditional
//!   SQL statement, so concurrent callers cannot observe a half-applied
//!   transition.
//! - **[`StatsLedger`]**: owns additive win/loss/draw counters, updated
//!   exactly once per participant when a match finishes.
//!
//! The board blob is opaque here: win and draw detection, rendering, and
//! participant identity all belong to the front-end collaborator.
//!
//! # Example
//!
//! ```no_run
//! use versus::{MatchResult, MatchStore};
//!
//! # fn example() -> Result<(), versus::StoreError> {
//! let store = MatchStore::open("matches.db")?;
//!
//! let match_id = store.create(42)?;
//! assert!(store.join(&match_id, 7)?);
//!
//! store.update_board(&match_id, r#"["X","","","","","","","",""]"#)?;
//! store.finish(&match_id, MatchResult::Winner(42))?;
//!
//! let stats = store.ledger().get(42)?.unwrap();
//! assert_eq!(*stats.wins(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod conn;
mod error;
mod ledger;
mod models;
mod schema;
mod store;

// Crate-level exports - errors
pub use error::StoreError;

// Crate-level exports - stats ledger
pub use ledger::StatsLedger;

// Crate-level exports - record models and domain types
pub use models::{DRAW_SENTINEL, MatchRecord, MatchResult, MatchStatus, Outcome, StatsRecord};

// Crate-level exports - match store
pub use store::MatchStore;
