//! Log vocabulary shared by every DataAccess crate
//!
//! Kept dependency-free so log consumers can depend on it alone.

pub mod schema;
