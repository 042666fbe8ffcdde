//! Record model
//!
//! Explicit per-type schemas replace runtime reflection: every record type
//! publishes an ordered table of (column name, semantic tag, accessor) entries
//! through the `Record` trait, usually generated with [`impl_record!`].
//!
//! [`impl_record!`]: crate::impl_record

pub mod kind;
pub mod schema;
pub mod value;

pub use kind::FieldKind;
pub use schema::{
    FieldDescriptor, Record, RecordSchema, CREATE_TIMESTAMP_FIELD, ID_FIELD,
    LAST_UPDATE_TIMESTAMP_FIELD,
};
pub use value::{parse_literal, BlobElement, FieldType, FieldValue};
