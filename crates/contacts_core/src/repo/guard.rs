//! Connection guard run before every store operation.
//!
//! # Invariants
//! - A closed handle fails with `StoreError::Connection`, never a lower-level
//!   SQLite error.
//! - The guard only checks; it never reopens or retries.

use crate::db::probe_connection;
use crate::repo::contact_repo::{StoreError, StoreResult};
use rusqlite::Connection;

const CONNECTION_CLOSED: &str = "database connection is closed";

/// Returns the live handle or fails fast with a connection error.
pub fn ensure_connection(slot: &Option<Connection>) -> StoreResult<&Connection> {
    let conn = slot
        .as_ref()
        .ok_or_else(|| StoreError::Connection(CONNECTION_CLOSED.to_string()))?;
    probe(conn)?;
    Ok(conn)
}

/// Mutable variant of [`ensure_connection`] for transactional paths.
pub fn ensure_connection_mut(slot: &mut Option<Connection>) -> StoreResult<&mut Connection> {
    let conn = slot
        .as_mut()
        .ok_or_else(|| StoreError::Connection(CONNECTION_CLOSED.to_string()))?;
    probe(conn)?;
    Ok(conn)
}

fn probe(conn: &Connection) -> StoreResult<()> {
    probe_connection(conn)
        .map_err(|err| StoreError::Connection(format!("database connection lost: {err}")))
}
