//! Core data layer for the contacts manager.
//! This crate is the single source of truth for contact invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod transfer;

pub use config::credentials::{
    default_config_dir, CredentialError, CredentialStore, SavedCredentials,
};
pub use db::{ConnectionSettings, DbError, StoreLocation, DEFAULT_PORT};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::contact::{
    is_valid_email, Contact, ContactDraft, ContactId, ContactValidationError,
};
pub use repo::contact_repo::{
    ContactRepository, ImportOutcome, SortColumn, SortDirection, SqliteContactRepository,
    StoreError, StoreResult, SORTABLE_COLUMNS,
};
pub use service::contact_service::ContactService;
pub use service::events::{ChangeEvent, ChangeFeed};
pub use transfer::csv::{TransferError, CSV_HEADER};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
