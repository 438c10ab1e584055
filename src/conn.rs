//! Per-operation SQLite connection establishment.

use diesel::prelude::*;
use tracing::{debug, instrument};

use crate::error::StoreError;

/// Establishes a connection to the database at the given path.
///
/// Sets a busy timeout so interleaved writers wait for the lock instead of
/// failing immediately; every mutating statement in this crate carries its
/// precondition inline, so waiting is always safe.
#[instrument(skip(db_path), fields(db_path = %db_path))]
pub(crate) fn establish(db_path: &str) -> Result<SqliteConnection, StoreError> {
    debug!("Establishing connection");
    let mut conn = SqliteConnection::establish(db_path)?;
    diesel::sql_query("PRAGMA busy_timeout = 5000;").execute(&mut conn)?;
    Ok(conn)
}
