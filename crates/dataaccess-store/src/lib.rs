//! DataAccess Store - SQLite-backed record mapper
//!
//! Provides:
//! - `SqliteDataResource`: owns the connection lifecycle (acquire / release)
//! - `SqliteDataHandler`: create, update, delete, count, first and get for
//!   any `Record` type, driven by a `Query`
//! - The value codec between `FieldValue` and SQLite parameters / columns
//! - SQL text builders for each operation

pub mod codec;
pub mod errors;
pub mod handler;
pub mod resource;
pub mod sql;

// Re-export key types
pub use errors::Result;
pub use handler::SqliteDataHandler;
pub use resource::SqliteDataResource;
