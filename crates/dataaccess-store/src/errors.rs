//! Error helpers for dataaccess-store
//!
//! Wraps dataaccess-core `DataError` with store-specific constructors

use dataaccess_core::errors::{DataError, DataErrorKind};

pub use dataaccess_core::errors::Result;

/// Create a persistence error from `rusqlite::Error`
pub fn from_rusqlite(err: rusqlite::Error) -> DataError {
    DataError::new(DataErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// An UPDATE or DELETE matched no row
pub fn nothing_affected(op: &str, table: &str) -> DataError {
    DataError::new(DataErrorKind::NothingAffected)
        .with_op(op.to_string())
        .with_table(table.to_string())
        .with_message(format!("nothing to {}", op))
}

/// A SELECT matched no row
pub fn not_found(op: &str, table: &str) -> DataError {
    DataError::new(DataErrorKind::NotFound)
        .with_op(op.to_string())
        .with_table(table.to_string())
        .with_message("no matching row")
}

/// The database could not be opened, or is not open
pub fn resource_unavailable(location: &str, reason: &str) -> DataError {
    DataError::new(DataErrorKind::ResourceUnavailable)
        .with_op("acquire")
        .with_message(format!("cannot open database at {}: {}", location, reason))
}

/// The caller handed in something the operation cannot work with
pub fn invalid_input(op: &str, message: &str) -> DataError {
    DataError::new(DataErrorKind::InvalidInput)
        .with_op(op.to_string())
        .with_message(message.to_string())
}
