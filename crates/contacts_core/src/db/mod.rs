//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Resolve connection settings into a concrete SQLite location.
//! - Open and configure SQLite connections for the contacts core.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Opening a connection never creates or alters the schema.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
mod settings;

pub use open::{open_db, open_db_in_memory, probe_connection, register_functions, FOLD_FUNCTION};
pub use settings::{ConnectionSettings, StoreLocation, DEFAULT_PORT, MEMORY_DATABASE};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    InvalidSettings(String),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::InvalidSettings(message) => write!(f, "invalid connection settings: {message}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::InvalidSettings(_) => None,
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
