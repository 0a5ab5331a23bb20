//! Contact record store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, query and bulk import APIs over the `contacts` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every operation passes the connection guard first.
//! - `import_contacts` is all-or-nothing: a failing row rolls back the batch.
//! - Sort columns are resolved through `SortColumn`; unknown names fall back
//!   to `last_name` before any SQL is built.
//! - Contact field values are never logged; ids and counts are.

use crate::db::migrations::apply_migrations;
use crate::db::{open_db, register_functions, ConnectionSettings, DbError};
use crate::model::contact::{Contact, ContactDraft, ContactId, ContactValidationError};
use crate::repo::guard::{ensure_connection, ensure_connection_mut};
use log::{error, info, warn};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    email,
    mobile
FROM contacts";

const CONTACT_INSERT_SQL: &str = "INSERT INTO contacts (
    first_name,
    last_name,
    email,
    mobile
) VALUES (?1, ?2, ?3, ?4);";

const NAME_ORDER_SQL: &str = "ORDER BY last_name ASC, first_name ASC, id ASC";

/// Column names accepted by `sorted_contacts`.
pub const SORTABLE_COLUMNS: &[&str] = &["id", "first_name", "last_name", "email", "mobile"];

pub type StoreResult<T> = Result<T, StoreError>;

/// Typed failure for record store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Handle could not be established, or has been closed/lost.
    Connection(String),
    /// Caller-supplied fields violate an invariant; nothing reached storage.
    Validation(ContactValidationError),
    /// An identifier-keyed mutation matched zero rows.
    NotFound(ContactId),
    /// Schema creation or migration failed.
    Schema(DbError),
    /// Any other backing store failure.
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(message) => write!(f, "{message}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "contact not found with id: {id}"),
            Self::Schema(err) => write!(f, "schema initialization error: {err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection(_) => None,
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Schema(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<ContactValidationError> for StoreError {
    fn from(value: ContactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Allow-listed sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Id,
    FirstName,
    LastName,
    Email,
    Mobile,
}

impl SortColumn {
    /// SQL column name. The only strings ever interpolated into ORDER BY.
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Mobile => "mobile",
        }
    }

    /// Strict lookup; `None` for anything outside the allow-list.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "id" => Some(Self::Id),
            "first_name" => Some(Self::FirstName),
            "last_name" => Some(Self::LastName),
            "email" => Some(Self::Email),
            "mobile" => Some(Self::Mobile),
            _ => None,
        }
    }

    /// Lenient lookup used by `sorted_contacts`; falls back to `LastName`.
    pub fn from_column_name(value: &str) -> Self {
        Self::parse(value).unwrap_or(Self::LastName)
    }
}

/// Sort direction for `sorted_contacts`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            Self::Ascending
        } else {
            Self::Descending
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Result of a bulk import transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Every row was inserted and the transaction committed.
    Committed { inserted: usize },
    /// Row `failed_row` (zero-based) failed; nothing from the batch persisted.
    RolledBack { failed_row: usize, reason: String },
}

impl ImportOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Repository interface for contact persistence.
pub trait ContactRepository {
    /// Returns whether the handle is alive and answers a trivial query.
    fn test_connection(&self) -> bool;
    /// Creates table, indexes and triggers if absent. Idempotent.
    fn ensure_schema(&mut self) -> StoreResult<()>;
    /// Validates and inserts one contact, returning the assigned id.
    fn insert_contact(&mut self, draft: &ContactDraft) -> StoreResult<ContactId>;
    /// Validates and overwrites every field of an existing contact.
    fn update_contact(&mut self, id: ContactId, draft: &ContactDraft) -> StoreResult<()>;
    fn delete_contact(&mut self, id: ContactId) -> StoreResult<()>;
    /// Empties the table and returns the number of removed rows.
    fn delete_all_contacts(&mut self) -> StoreResult<usize>;
    fn get_contact(&self, id: ContactId) -> StoreResult<Option<Contact>>;
    /// Lists every contact by last name, then first name.
    fn list_contacts(&self) -> StoreResult<Vec<Contact>>;
    /// Case-insensitive substring search; an empty query lists everything.
    fn search_contacts(&self, query: &str) -> StoreResult<Vec<Contact>>;
    /// Lists every contact ordered by an allow-listed column.
    fn sorted_contacts(&self, column: &str, direction: SortDirection)
        -> StoreResult<Vec<Contact>>;
    fn count_contacts(&self) -> StoreResult<i64>;
    /// Inserts all drafts in one transaction or none of them.
    fn import_contacts(&mut self, drafts: &[ContactDraft]) -> StoreResult<ImportOutcome>;
}

/// SQLite-backed record store. Exclusively owns its connection handle.
///
/// Not `Sync`: callers sharing one store across threads must wrap it in a
/// mutex themselves.
pub struct SqliteContactRepository {
    conn: Option<Connection>,
}

impl SqliteContactRepository {
    /// Opens a handle from settings and probes it once.
    ///
    /// # Errors
    /// - `Connection` when settings are incomplete, the database cannot be
    ///   opened, or the liveness probe fails.
    pub fn connect(settings: &ConnectionSettings) -> StoreResult<Self> {
        let conn = open_db(settings)
            .map_err(|err| StoreError::Connection(format!("database connection error: {err}")))?;
        Ok(Self { conn: Some(conn) })
    }

    /// Wraps an already-open connection after probing it.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        register_functions(&conn)
            .map_err(|err| StoreError::Connection(format!("database connection error: {err}")))?;
        let slot = Some(conn);
        ensure_connection(&slot)?;
        Ok(Self { conn: slot })
    }

    /// Guarded access to the underlying handle.
    pub fn connection(&self) -> StoreResult<&Connection> {
        ensure_connection(&self.conn)
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Releases the handle. Later operations fail with `Connection`.
    pub fn close(&mut self) -> StoreResult<()> {
        match self.conn.take() {
            Some(conn) => {
                conn.close().map_err(|(_, err)| StoreError::from(err))?;
                info!("event=db_close module=repo status=ok");
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn query_contacts(&self, sql: &str, bind: &[&dyn rusqlite::ToSql]) -> StoreResult<Vec<Contact>> {
        let conn = ensure_connection(&self.conn)?;
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }
        Ok(contacts)
    }
}

impl ContactRepository for SqliteContactRepository {
    fn test_connection(&self) -> bool {
        ensure_connection(&self.conn).is_ok()
    }

    fn ensure_schema(&mut self) -> StoreResult<()> {
        let conn = ensure_connection_mut(&mut self.conn)?;
        match apply_migrations(conn) {
            Ok(upgrade) => {
                info!(
                    "event=schema_ensure module=repo status=ok from_version={} to_version={}",
                    upgrade.from, upgrade.to
                );
                Ok(())
            }
            Err(err) => {
                error!("event=schema_ensure module=repo status=error error={err}");
                Err(StoreError::Schema(err))
            }
        }
    }

    fn insert_contact(&mut self, draft: &ContactDraft) -> StoreResult<ContactId> {
        if let Err(err) = draft.validate() {
            warn!("event=contact_insert module=repo status=rejected reason=validation");
            return Err(err.into());
        }

        let conn = ensure_connection(&self.conn)?;
        conn.execute(
            CONTACT_INSERT_SQL,
            params![
                draft.first_name.as_str(),
                draft.last_name.as_str(),
                draft.email.as_str(),
                draft.mobile.as_str(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        info!("event=contact_insert module=repo status=ok contact_id={id}");
        Ok(id)
    }

    fn update_contact(&mut self, id: ContactId, draft: &ContactDraft) -> StoreResult<()> {
        if let Err(err) = draft.validate() {
            warn!("event=contact_update module=repo status=rejected reason=validation contact_id={id}");
            return Err(err.into());
        }

        let conn = ensure_connection(&self.conn)?;
        let changed = conn.execute(
            "UPDATE contacts
             SET
                first_name = ?1,
                last_name = ?2,
                email = ?3,
                mobile = ?4
             WHERE id = ?5;",
            params![
                draft.first_name.as_str(),
                draft.last_name.as_str(),
                draft.email.as_str(),
                draft.mobile.as_str(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        info!("event=contact_update module=repo status=ok contact_id={id}");
        Ok(())
    }

    fn delete_contact(&mut self, id: ContactId) -> StoreResult<()> {
        let conn = ensure_connection(&self.conn)?;
        let changed = conn.execute("DELETE FROM contacts WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        info!("event=contact_delete module=repo status=ok contact_id={id}");
        Ok(())
    }

    fn delete_all_contacts(&mut self) -> StoreResult<usize> {
        let conn = ensure_connection(&self.conn)?;
        let removed = conn.execute("DELETE FROM contacts;", [])?;
        info!("event=contact_delete_all module=repo status=ok removed={removed}");
        Ok(removed)
    }

    fn get_contact(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        let conn = ensure_connection(&self.conn)?;
        let mut stmt = conn.prepare(&format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contact_row(row)?));
        }

        Ok(None)
    }

    fn list_contacts(&self) -> StoreResult<Vec<Contact>> {
        self.query_contacts(&format!("{CONTACT_SELECT_SQL} {NAME_ORDER_SQL};"), &[])
    }

    fn search_contacts(&self, query: &str) -> StoreResult<Vec<Contact>> {
        if query.is_empty() {
            return self.list_contacts();
        }

        // Both sides are folded so matching ignores case beyond ASCII.
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        self.query_contacts(
            &format!(
                r"{CONTACT_SELECT_SQL}
                 WHERE contacts_fold(first_name) LIKE ?1 ESCAPE '\'
                    OR contacts_fold(last_name) LIKE ?1 ESCAPE '\'
                    OR contacts_fold(email) LIKE ?1 ESCAPE '\'
                    OR contacts_fold(mobile) LIKE ?1 ESCAPE '\'
                 {NAME_ORDER_SQL};"
            ),
            &[&pattern],
        )
    }

    fn sorted_contacts(
        &self,
        column: &str,
        direction: SortDirection,
    ) -> StoreResult<Vec<Contact>> {
        let column = SortColumn::from_column_name(column);
        let order = direction.as_sql();
        let sql = match column {
            SortColumn::Id => format!("{CONTACT_SELECT_SQL} ORDER BY id {order};"),
            other => format!(
                "{CONTACT_SELECT_SQL} ORDER BY {} {order}, id {order};",
                other.column_name()
            ),
        };
        self.query_contacts(&sql, &[])
    }

    fn count_contacts(&self) -> StoreResult<i64> {
        let conn = ensure_connection(&self.conn)?;
        let count = conn.query_row("SELECT COUNT(*) FROM contacts;", [], |row| {
            row.get::<_, i64>(0)
        })?;
        Ok(count)
    }

    fn import_contacts(&mut self, drafts: &[ContactDraft]) -> StoreResult<ImportOutcome> {
        let started_at = Instant::now();
        let conn = ensure_connection_mut(&mut self.conn)?;
        let tx = conn.transaction()?;

        let failure = {
            let mut stmt = tx.prepare(CONTACT_INSERT_SQL)?;
            let mut failure = None;
            for (index, draft) in drafts.iter().enumerate() {
                let inserted = stmt.execute(params![
                    draft.first_name.as_str(),
                    draft.last_name.as_str(),
                    draft.email.as_str(),
                    draft.mobile.as_str(),
                ]);
                if let Err(err) = inserted {
                    failure = Some((index, err));
                    break;
                }
            }
            failure
        };

        match failure {
            Some((failed_row, err)) => {
                tx.rollback()?;
                error!(
                    "event=contact_import module=repo status=rolled_back rows={} failed_row={} duration_ms={} error={}",
                    drafts.len(),
                    failed_row,
                    started_at.elapsed().as_millis(),
                    err
                );
                Ok(ImportOutcome::RolledBack {
                    failed_row,
                    reason: err.to_string(),
                })
            }
            None => {
                tx.commit()?;
                info!(
                    "event=contact_import module=repo status=ok rows={} duration_ms={}",
                    drafts.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(ImportOutcome::Committed {
                    inserted: drafts.len(),
                })
            }
        }
    }
}

fn parse_contact_row(row: &Row<'_>) -> StoreResult<Contact> {
    Ok(Contact {
        id: row.get("id")?,
        first_name: row.get::<_, Option<String>>("first_name")?.unwrap_or_default(),
        last_name: row.get::<_, Option<String>>("last_name")?.unwrap_or_default(),
        email: row.get::<_, Option<String>>("email")?.unwrap_or_default(),
        mobile: row.get::<_, Option<String>>("mobile")?.unwrap_or_default(),
    })
}

/// Escapes LIKE wildcards so the query text matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
