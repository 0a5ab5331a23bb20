//! User-scoped configuration persisted between sessions.

pub mod credentials;
