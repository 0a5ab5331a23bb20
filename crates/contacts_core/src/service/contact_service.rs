//! Contact use-case service.
//!
//! # Responsibility
//! - Provide the entry points a presentation layer calls.
//! - Delegate persistence to repository implementations.
//! - Notify subscribers after successful mutations.
//!
//! # Invariants
//! - Writes surface every repository error unchanged.
//! - Reads never fail: a repository error is logged and reported as an empty
//!   list, zero count or absent contact.
//! - `import` reports `true` only when the whole batch committed.

use crate::model::contact::{Contact, ContactDraft, ContactId};
use crate::repo::contact_repo::{ContactRepository, ImportOutcome, SortDirection, StoreResult};
use crate::service::events::{ChangeEvent, ChangeFeed};
use log::error;
use std::sync::mpsc::Receiver;

/// Use-case service wrapper for contact operations.
pub struct ContactService<R: ContactRepository> {
    repo: R,
    feed: ChangeFeed,
}

impl<R: ContactRepository> ContactService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            feed: ChangeFeed::new(),
        }
    }

    /// Borrows the wrapped repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Consumes the service and returns the repository.
    pub fn into_repository(self) -> R {
        self.repo
    }

    /// Subscribes to change events published after successful writes.
    pub fn subscribe(&mut self) -> Receiver<ChangeEvent> {
        self.feed.subscribe()
    }

    pub fn test_connection(&self) -> bool {
        self.repo.test_connection()
    }

    pub fn ensure_schema(&mut self) -> StoreResult<()> {
        self.repo.ensure_schema()
    }

    pub fn insert(&mut self, draft: &ContactDraft) -> StoreResult<ContactId> {
        let id = self.repo.insert_contact(draft)?;
        self.feed.publish(ChangeEvent::Inserted(id));
        Ok(id)
    }

    pub fn update(&mut self, id: ContactId, draft: &ContactDraft) -> StoreResult<()> {
        self.repo.update_contact(id, draft)?;
        self.feed.publish(ChangeEvent::Updated(id));
        Ok(())
    }

    pub fn delete(&mut self, id: ContactId) -> StoreResult<()> {
        self.repo.delete_contact(id)?;
        self.feed.publish(ChangeEvent::Deleted(id));
        Ok(())
    }

    pub fn delete_all(&mut self) -> StoreResult<usize> {
        let removed = self.repo.delete_all_contacts()?;
        self.feed.publish(ChangeEvent::Cleared { removed });
        Ok(removed)
    }

    /// Looks up one contact; `None` when absent or when the lookup failed.
    pub fn get_by_id(&self, id: ContactId) -> Option<Contact> {
        match self.repo.get_contact(id) {
            Ok(contact) => contact,
            Err(err) => {
                error!("event=contact_get module=service status=error contact_id={id} error={err}");
                None
            }
        }
    }

    /// Lists all contacts; empty on failure.
    pub fn list_all(&self) -> Vec<Contact> {
        self.repo.list_contacts().unwrap_or_else(|err| {
            error!("event=contact_list module=service status=error error={err}");
            Vec::new()
        })
    }

    /// Substring search over all text fields; empty on failure.
    pub fn search(&self, query: &str) -> Vec<Contact> {
        self.repo.search_contacts(query).unwrap_or_else(|err| {
            error!("event=contact_search module=service status=error error={err}");
            Vec::new()
        })
    }

    /// Lists contacts ordered by `column`; empty on failure.
    pub fn sorted(&self, column: &str, ascending: bool) -> Vec<Contact> {
        self.repo
            .sorted_contacts(column, SortDirection::from_ascending(ascending))
            .unwrap_or_else(|err| {
                error!("event=contact_sort module=service status=error error={err}");
                Vec::new()
            })
    }

    /// Counts contacts; 0 on failure.
    pub fn count(&self) -> i64 {
        self.repo.count_contacts().unwrap_or_else(|err| {
            error!("event=contact_count module=service status=error error={err}");
            0
        })
    }

    /// Imports `drafts` atomically and reports how the transaction ended.
    pub fn try_import(&mut self, drafts: &[ContactDraft]) -> StoreResult<ImportOutcome> {
        let outcome = self.repo.import_contacts(drafts)?;
        if let ImportOutcome::Committed { inserted } = outcome {
            self.feed.publish(ChangeEvent::Imported { inserted });
        }
        Ok(outcome)
    }

    /// Imports `drafts` atomically; `true` only if every row committed.
    pub fn import(&mut self, drafts: &[ContactDraft]) -> bool {
        match self.try_import(drafts) {
            Ok(outcome) => outcome.is_committed(),
            Err(err) => {
                error!("event=contact_import module=service status=error error={err}");
                false
            }
        }
    }
}
