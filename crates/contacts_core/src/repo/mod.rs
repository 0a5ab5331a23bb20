//! Record store contracts and SQLite persistence.
//!
//! # Responsibility
//! - Define the data access contract for contacts.
//! - Isolate SQLite query details from service/presentation code.
//! - Check connection liveness before every operation.
//!
//! # Invariants
//! - Write paths call `ContactDraft::validate()` before SQL mutations
//!   (bulk import relies on storage constraints instead).
//! - Identifier-keyed mutations that match no row return `NotFound`.
//! - Only allow-listed column names are ever interpolated into SQL.

pub mod contact_repo;
pub mod guard;
