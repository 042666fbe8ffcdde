//! Field keys and event values of the structured log
//!
//! Emitters write these keys literally (tracing field names cannot be
//! constants); readers such as log processors and tests use the constants.

/// Module path of the emitting code
pub const FIELD_COMPONENT: &str = "component";
/// Mapper operation name: `create`, `update`, `delete`, `count`, `first`, `get`
pub const FIELD_OP: &str = "op";
/// One of the `EVENT_*` values below
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

/// Record type name, which is also the table name
pub const FIELD_TABLE: &str = "table";
pub const FIELD_FIELD: &str = "field";
/// Destination size reported by `get` when rows are left over
pub const FIELD_CAPACITY: &str = "capacity";

pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";
pub const FIELD_ERR_MESSAGE: &str = "err.message";

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
