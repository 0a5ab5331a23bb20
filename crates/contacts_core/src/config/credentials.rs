//! Saved connection profile (credential store).
//!
//! # Responsibility
//! - Persist the non-secret connection fields between sessions.
//! - Rebuild `ConnectionSettings` from a saved profile plus a password.
//!
//! # Invariants
//! - The password is never written to disk.
//! - The file holds exactly four lines: host, port, user, database.
//! - Saved fields never contain line breaks.
//! - On Unix the file is created owner-only and never holds data while
//!   wider permissions apply.

use crate::db::{ConnectionSettings, DEFAULT_PORT};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "contacts-app";
const CREDENTIALS_FILE_NAME: &str = "db_config.txt";

/// Errors raised while reading or writing the saved profile.
#[derive(Debug)]
pub enum CredentialError {
    Io(io::Error),
    InvalidPort(String),
    /// A field would break the line-per-field layout.
    LineBreakInField(&'static str),
    /// `$HOME` is not set, so no default location exists.
    NoHomeDir,
}

impl Display for CredentialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::InvalidPort(value) => write!(f, "saved port is not a valid number: `{value}`"),
            Self::LineBreakInField(field) => {
                write!(f, "saved {field} must not contain a line break")
            }
            Self::NoHomeDir => write!(f, "HOME is not set; cannot locate config directory"),
        }
    }
}

impl Error for CredentialError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::InvalidPort(_) | Self::LineBreakInField(_) | Self::NoHomeDir => None,
        }
    }
}

impl From<io::Error> for CredentialError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Non-secret connection fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedCredentials {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub database: String,
}

impl SavedCredentials {
    /// Copies the non-secret fields out of full settings.
    pub fn from_settings(settings: &ConnectionSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            user: settings.user.clone(),
            database: settings.database.clone(),
        }
    }

    /// Combines the saved fields with a password supplied at connect time.
    pub fn into_settings(self, password: impl Into<String>) -> ConnectionSettings {
        ConnectionSettings {
            host: self.host,
            port: self.port,
            user: self.user,
            password: password.into(),
            database: self.database,
        }
    }
}

/// Returns `$HOME/.config/contacts-app`.
pub fn default_config_dir() -> Result<PathBuf, CredentialError> {
    let home = std::env::var_os("HOME").ok_or(CredentialError::NoHomeDir)?;
    Ok(PathBuf::from(home).join(".config").join(CONFIG_DIR_NAME))
}

/// File-backed store for one saved profile.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store rooted at `config_dir`.
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        Self {
            path: config_dir.as_ref().join(CREDENTIALS_FILE_NAME),
        }
    }

    /// Store at the default per-user location.
    pub fn at_default_location() -> Result<Self, CredentialError> {
        Ok(Self::new(default_config_dir()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the saved profile, or `None` when nothing has been saved.
    ///
    /// Missing trailing lines read as empty; a missing port reads as the
    /// default port.
    pub fn load(&self) -> Result<Option<SavedCredentials>, CredentialError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let mut lines = text.lines().map(|line| line.trim_end_matches('\r'));
        let host = lines.next().unwrap_or_default().to_string();
        let port_text = lines.next().unwrap_or_default().trim();
        let port = if port_text.is_empty() {
            DEFAULT_PORT
        } else {
            port_text
                .parse::<u16>()
                .map_err(|_| CredentialError::InvalidPort(port_text.to_string()))?
        };
        let user = lines.next().unwrap_or_default().to_string();
        let database = lines.next().unwrap_or_default().to_string();

        Ok(Some(SavedCredentials {
            host,
            port,
            user,
            database,
        }))
    }

    /// Writes the profile, creating the config directory when needed.
    ///
    /// # Errors
    /// - `LineBreakInField` when host, user or database spans lines.
    /// - `Io` when the directory or file cannot be written.
    pub fn save(&self, credentials: &SavedCredentials) -> Result<(), CredentialError> {
        for (field, value) in [
            ("host", &credentials.host),
            ("user", &credentials.user),
            ("database", &credentials.database),
        ] {
            if value.contains(|c: char| c == '\n' || c == '\r') {
                return Err(CredentialError::LineBreakInField(field));
            }
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = format!(
            "{}\n{}\n{}\n{}\n",
            credentials.host, credentials.port, credentials.user, credentials.database
        );
        let mut file = open_private(&self.path)?;
        file.write_all(body.as_bytes())?;
        file.sync_all()?;
        info!(
            "event=credentials_save module=config status=ok path={}",
            self.path.display()
        );
        Ok(())
    }

    /// Removes the saved profile. Missing files are not an error.
    pub fn clear(&self) -> Result<(), CredentialError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("event=credentials_clear module=config status=ok");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                warn!("event=credentials_clear module=config status=error error={err}");
                Err(err.into())
            }
        }
    }
}

/// Opens `path` for truncating writes with owner-only permissions.
///
/// New files are created with mode 0600; an existing file is narrowed to
/// 0600 before it is truncated.
#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.set_len(0)?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::{CredentialError, CredentialStore, SavedCredentials};
    use crate::db::{ConnectionSettings, DEFAULT_PORT};

    fn sample() -> SavedCredentials {
        SavedCredentials {
            host: "db.local".to_string(),
            port: 3307,
            user: "alice".to_string(),
            database: "address_book".to_string(),
        }
    }

    #[test]
    fn load_returns_none_when_nothing_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_then_load_returns_same_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("nested"));
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "db.local\n3307\nalice\naddress_book\n");
    }

    #[test]
    fn saved_profile_never_contains_password() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        let settings = ConnectionSettings::new("h", "u", "s3cret", "db", DEFAULT_PORT);
        store.save(&SavedCredentials::from_settings(&settings)).unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(!text.contains("s3cret"));

        let restored = store.load().unwrap().unwrap().into_settings("typed-again");
        assert_eq!(restored.password, "typed-again");
        assert_eq!(restored.host, "h");
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        store.save(&sample()).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn overwriting_a_wide_file_narrows_it_to_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        std::fs::write(store.path(), "old\n").unwrap();
        std::fs::set_permissions(store.path(), std::fs::Permissions::from_mode(0o644)).unwrap();

        store.save(&sample()).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.load().unwrap(), Some(sample()));
    }

    #[test]
    fn fields_with_line_breaks_are_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());

        let mut bad_host = sample();
        bad_host.host = "db\n6000".to_string();
        assert!(matches!(
            store.save(&bad_host),
            Err(CredentialError::LineBreakInField("host"))
        ));

        let mut bad_database = sample();
        bad_database.database = "book\r".to_string();
        assert!(matches!(
            store.save(&bad_database),
            Err(CredentialError::LineBreakInField("database"))
        ));

        assert!(!store.path().exists());
    }

    #[test]
    fn short_file_reads_defaults_and_bad_port_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());

        std::fs::write(store.path(), "only-host\n").unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.host, "only-host");
        assert_eq!(loaded.port, DEFAULT_PORT);
        assert!(loaded.user.is_empty());

        std::fs::write(store.path(), "h\nnot-a-port\nu\nd\n").unwrap();
        assert!(matches!(
            store.load(),
            Err(CredentialError::InvalidPort(value)) if value == "not-a-port"
        ));
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        store.save(&sample()).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
