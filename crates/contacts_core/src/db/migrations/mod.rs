//! Contacts schema versioning.
//!
//! # Responsibility
//! - Hold the ordered list of schema steps for the `contacts` table.
//! - Bring a database from its stored schema version up to the latest one.
//!
//! # Invariants
//! - A step's version is its position in `SCHEMA_STEPS`, starting at 1.
//! - The version reached is stored in `PRAGMA user_version`.
//! - Pending steps run in one transaction; a failing step leaves the
//!   database at its previous version.
//! - A database stamped newer than this build is refused, never modified.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Schema steps in application order. Append only.
const SCHEMA_STEPS: &[&str] = &[
    // contacts table, name and email indexes, updated_at trigger
    include_str!("0001_contacts.sql"),
];

/// Version change performed by one `apply_migrations` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaUpgrade {
    pub from: u32,
    pub to: u32,
}

impl SchemaUpgrade {
    /// `true` when the database was already current.
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Latest schema version this build can create.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.len() as u32
}

/// Runs every step newer than the stored version.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the stored version is newer than
///   `latest_version()`.
/// - `Sqlite` when a step fails; nothing from the batch is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<SchemaUpgrade> {
    let from = stored_schema_version(conn)?;
    let to = latest_version();

    if from > to {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: to,
        });
    }

    let upgrade = SchemaUpgrade { from, to };
    if upgrade.is_noop() {
        return Ok(upgrade);
    }

    let tx = conn.transaction()?;
    for (index, sql) in SCHEMA_STEPS.iter().enumerate().skip(from as usize) {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", index as u32 + 1)?;
    }
    tx.commit()?;

    Ok(upgrade)
}

/// Schema version recorded in the database header (0 for a new file).
pub fn stored_schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, stored_schema_version, SchemaUpgrade};
    use rusqlite::Connection;

    #[test]
    fn fresh_database_upgrades_from_zero_then_stays_put() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(stored_schema_version(&conn).unwrap(), 0);

        let first = apply_migrations(&mut conn).unwrap();
        assert_eq!(
            first,
            SchemaUpgrade {
                from: 0,
                to: latest_version()
            }
        );
        assert!(!first.is_noop());

        let second = apply_migrations(&mut conn).unwrap();
        assert!(second.is_noop());
        assert_eq!(stored_schema_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn failed_step_keeps_previous_version() {
        let mut conn = Connection::open_in_memory().unwrap();
        // A clashing object makes the first step fail part way through.
        conn.execute_batch("CREATE TABLE idx_contacts_name (x);")
            .unwrap();

        assert!(apply_migrations(&mut conn).is_err());
        assert_eq!(stored_schema_version(&conn).unwrap(), 0);
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'contacts';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);
    }
}
