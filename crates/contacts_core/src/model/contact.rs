//! Contact record and validation rules.
//!
//! # Responsibility
//! - Define the read model (`Contact`) returned to callers.
//! - Define the write model (`ContactDraft`) accepted by insert/update/import.
//! - Provide the email pattern check used before writes.
//!
//! # Invariants
//! - `ContactDraft::validate()` rejects drafts where both names are empty.
//! - A non-empty email must match `local@domain.tld`; empty email is allowed.
//! - `mobile` is free-form.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Store-assigned identifier. Monotonically increasing and never reused.
pub type ContactId = i64;

/// Persisted contact as returned by the store.
///
/// Callers always receive owned copies; nothing here borrows from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
}

impl Contact {
    /// Returns the writable fields of this contact.
    pub fn to_draft(&self) -> ContactDraft {
        ContactDraft {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            mobile: self.mobile.clone(),
        }
    }

    /// Display name in `last, first` order, skipping empty parts.
    pub fn display_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{}, {}", self.last_name, self.first_name),
            (true, false) => self.last_name.clone(),
            (false, true) => self.first_name.clone(),
            (true, true) => String::new(),
        }
    }
}

/// Field values for insert, update and bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
}

impl ContactDraft {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        mobile: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            mobile: mobile.into(),
        }
    }

    /// Returns whether at least one name field carries text.
    pub fn has_name(&self) -> bool {
        !self.first_name.is_empty() || !self.last_name.is_empty()
    }

    /// Validates draft fields before they reach storage.
    ///
    /// # Errors
    /// - `MissingName` when first and last name are both empty.
    /// - `InvalidEmail` when email is non-empty and fails the pattern.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        if !self.has_name() {
            return Err(ContactValidationError::MissingName);
        }
        if !self.email.is_empty() && !is_valid_email(&self.email) {
            return Err(ContactValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

/// Returns whether `email` matches the accepted address shape.
///
/// Pattern only: no DNS lookup or mailbox verification is attempted.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Field-level validation failures raised before any SQL runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    MissingName,
    InvalidEmail(String),
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => {
                write!(f, "at least first name or last name must be provided")
            }
            Self::InvalidEmail(value) => write!(f, "invalid email format: `{value}`"),
        }
    }
}

impl Error for ContactValidationError {}
