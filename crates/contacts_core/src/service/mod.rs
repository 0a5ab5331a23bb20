//! Core use-case services.
//!
//! # Responsibility
//! - Expose the presentation-facing contact API on top of a repository.
//! - Publish change notifications after successful mutations.
//!
//! # See also
//! - `repo::contact_repo` for the strict, error-propagating store.

pub mod contact_service;
pub mod events;
