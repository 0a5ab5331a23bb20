//! Connection settings for opening a contacts store.

use super::{DbError, DbResult};
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};

/// Port used when no explicit or saved port is available.
pub const DEFAULT_PORT: u16 = 3306;
/// Database name that selects a private in-memory store.
pub const MEMORY_DATABASE: &str = ":memory:";

const DATABASE_FILE_EXTENSION: &str = "sqlite3";

/// Where the SQLite handle for a settings value lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    File(PathBuf),
}

/// Values required to construct a store handle.
///
/// `host`, `port` and `user` identify the connection profile. The password
/// may be empty and is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionSettings {
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            database: database.into(),
        }
    }

    /// Settings for a throwaway in-memory store.
    pub fn in_memory() -> Self {
        Self::new("localhost", "contacts", "", MEMORY_DATABASE, DEFAULT_PORT)
    }

    /// Checks required fields.
    ///
    /// # Errors
    /// - `InvalidSettings` when host, user or database is blank, or port is 0.
    pub fn validate(&self) -> DbResult<()> {
        for (field, value) in [
            ("host", &self.host),
            ("user", &self.user),
            ("database", &self.database),
        ] {
            if value.trim().is_empty() {
                return Err(DbError::InvalidSettings(format!("{field} must not be empty")));
            }
        }
        if self.port == 0 {
            return Err(DbError::InvalidSettings("port must not be 0".to_string()));
        }
        Ok(())
    }

    /// Resolves the database name into a store location.
    ///
    /// Names without an extension get `.sqlite3` appended.
    pub fn location(&self) -> StoreLocation {
        let database = self.database.trim();
        if database == MEMORY_DATABASE {
            return StoreLocation::Memory;
        }
        let path = Path::new(database);
        if path.extension().is_some() {
            StoreLocation::File(path.to_path_buf())
        } else {
            StoreLocation::File(path.with_extension(DATABASE_FILE_EXTENSION))
        }
    }
}

impl Debug for ConnectionSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectionSettings, StoreLocation, DEFAULT_PORT};
    use std::path::PathBuf;

    #[test]
    fn validate_requires_host_user_database_and_port() {
        assert!(ConnectionSettings::new("localhost", "me", "", "contacts", DEFAULT_PORT)
            .validate()
            .is_ok());

        let missing_host = ConnectionSettings::new(" ", "me", "pw", "contacts", DEFAULT_PORT);
        assert!(missing_host.validate().unwrap_err().to_string().contains("host"));

        let missing_user = ConnectionSettings::new("localhost", "", "pw", "contacts", DEFAULT_PORT);
        assert!(missing_user.validate().unwrap_err().to_string().contains("user"));

        let missing_db = ConnectionSettings::new("localhost", "me", "pw", "", DEFAULT_PORT);
        assert!(missing_db.validate().unwrap_err().to_string().contains("database"));

        let zero_port = ConnectionSettings::new("localhost", "me", "pw", "contacts", 0);
        assert!(zero_port.validate().unwrap_err().to_string().contains("port"));
    }

    #[test]
    fn location_appends_extension_only_when_missing() {
        let bare = ConnectionSettings::new("h", "u", "", "contacts", DEFAULT_PORT);
        assert_eq!(
            bare.location(),
            StoreLocation::File(PathBuf::from("contacts.sqlite3"))
        );

        let explicit = ConnectionSettings::new("h", "u", "", "/tmp/book.db", DEFAULT_PORT);
        assert_eq!(
            explicit.location(),
            StoreLocation::File(PathBuf::from("/tmp/book.db"))
        );

        assert_eq!(ConnectionSettings::in_memory().location(), StoreLocation::Memory);
    }

    #[test]
    fn debug_output_redacts_password() {
        let settings = ConnectionSettings::new("h", "u", "hunter2", "contacts", DEFAULT_PORT);
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
