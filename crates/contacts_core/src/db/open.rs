//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections from `ConnectionSettings`.
//! - Configure connection pragmas required by core behavior.
//! - Run an immediate liveness probe before handing the connection out.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections carry the `contacts_fold` SQL function.
//! - Returned connections answered `SELECT 1` at least once.
//! - The password is never logged.

use super::settings::{ConnectionSettings, StoreLocation};
use super::DbResult;
use log::{error, info};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQL name of the Unicode lowercase fold used by search.
pub const FOLD_FUNCTION: &str = "contacts_fold";

/// Opens the store described by `settings` and probes it once.
///
/// # Side effects
/// - Creates the database file when it does not exist yet.
/// - Emits `db_open` logging events with duration and status.
///
/// # Errors
/// - `InvalidSettings` when required fields are missing.
/// - `Sqlite` when the file cannot be opened or the probe fails.
pub fn open_db(settings: &ConnectionSettings) -> DbResult<Connection> {
    let started_at = Instant::now();
    settings.validate()?;

    let location = settings.location();
    let mode = match location {
        StoreLocation::Memory => "memory",
        StoreLocation::File(_) => "file",
    };
    info!(
        "event=db_open module=db status=start mode={} host={} port={} user={}",
        mode, settings.host, settings.port, settings.user
    );

    let opened = match &location {
        StoreLocation::Memory => Connection::open_in_memory(),
        StoreLocation::File(path) => Connection::open(path),
    };
    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens a private in-memory store with default settings.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_db(&ConnectionSettings::in_memory())
}

/// Runs the liveness query against an open handle.
pub fn probe_connection(conn: &Connection) -> DbResult<()> {
    conn.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}

/// Registers `contacts_fold(text)`, which lowercases with full Unicode
/// case mapping. `NULL` folds to `NULL`.
pub fn register_functions(conn: &Connection) -> DbResult<()> {
    conn.create_scalar_function(
        FOLD_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|value| value.to_lowercase()))
        },
    )?;
    Ok(())
}

fn bootstrap_connection(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    register_functions(conn)?;
    probe_connection(conn)
}
