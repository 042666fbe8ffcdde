//! DataAccess Core - record schemas, value codec and query grammar
//!
//! This crate holds everything about record mapping that does not touch a
//! database connection:
//! - Record type descriptors (`Record`, `RecordSchema`, `FieldDescriptor`)
//!   and the `impl_record!` macro that generates them
//! - Semantic type tags (`FieldKind`) and tagged values (`FieldValue`)
//! - The fluent WHERE grammar (`Query`, `Operator`, `QueryParameter`)
//! - The error facility (`DataError`, `DataErrorKind`, `DataAccessError`)
//! - The structured logging facility
//!
//! The SQLite-backed mapper lives in `dataaccess-store`.

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod query;

pub use dataaccess_core_types::schema;

// Re-export commonly used types
pub use errors::{DataAccessError, DataError, DataErrorKind, Result};
pub use model::{
    BlobElement, FieldDescriptor, FieldKind, FieldType, FieldValue, Record, RecordSchema,
};
pub use query::{Operator, Query, QueryParameter};

#[doc(hidden)]
pub use tracing as __tracing;
