//! Bulk transfer between the record store and flat files.

pub mod csv;
