//! Contact domain model.
//!
//! # Responsibility
//! - Define the single persisted entity and its write-side draft.
//! - Own field validation shared by the store, the service and callers.
//!
//! # Invariants
//! - Every persisted contact is identified by a store-assigned `ContactId`.
//! - At least one of first/last name is non-empty for any persisted contact.
//! - Deletion is a hard delete; there are no tombstones.

pub mod contact;
