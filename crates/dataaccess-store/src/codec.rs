//! Value codec between `FieldValue` and SQLite
//!
//! Binding and reading are two independent matches over the tag. Both
//! record-level helpers are best-effort: a failing field is logged and the
//! remaining fields are still processed, then the first failure is returned.

use dataaccess_core::errors::{DataAccessError, DataError};
use dataaccess_core::model::{FieldKind, FieldValue, RecordSchema};
use dataaccess_core::QueryParameter;
use rusqlite::types::ValueRef;
use rusqlite::{Row, Statement};

use crate::errors::{from_rusqlite, Result};

/// Bind one value to the 1-based parameter `index`
///
/// # Errors
///
/// Returns the rusqlite error when SQLite rejects the bind.
pub fn bind_value(
    stmt: &mut Statement<'_>,
    index: usize,
    value: &FieldValue,
) -> rusqlite::Result<()> {
    match value {
        FieldValue::Int8(v) => stmt.raw_bind_parameter(index, i64::from(*v)),
        FieldValue::UInt8(v) => stmt.raw_bind_parameter(index, i64::from(*v)),
        FieldValue::Int16(v) => stmt.raw_bind_parameter(index, i64::from(*v)),
        FieldValue::UInt16(v) => stmt.raw_bind_parameter(index, i64::from(*v)),
        FieldValue::Int32(v) => stmt.raw_bind_parameter(index, i64::from(*v)),
        FieldValue::UInt32(v) => stmt.raw_bind_parameter(index, i64::from(*v)),
        FieldValue::Int64(v) => stmt.raw_bind_parameter(index, *v),
        // Stored as the same 64 bits; read back with the inverse cast
        FieldValue::UInt64(v) => stmt.raw_bind_parameter(index, *v as i64),
        FieldValue::Float32(v) => stmt.raw_bind_parameter(index, f64::from(*v)),
        FieldValue::Float64(v) => stmt.raw_bind_parameter(index, *v),
        FieldValue::Bool(v) => stmt.raw_bind_parameter(index, i64::from(*v)),
        FieldValue::String(v) => stmt.raw_bind_parameter(index, v.as_str()),
        FieldValue::ByteArray { bytes, .. } => stmt.raw_bind_parameter(index, bytes.as_slice()),
    }
}

/// Convert one result column into a value of tag `kind`
///
/// `NULL` reads as the tag's zero value. Other storage classes are coerced
/// the way SQLite's own column accessors would.
///
/// # Errors
///
/// `OutOfRange` when an integer does not fit a narrow tag, `InvalidLiteral`
/// for numeric tags over non-numeric text, `TypeMismatch` for a blob read as
/// a number or a number read as a blob.
pub fn read_value(
    column: ValueRef<'_>,
    kind: FieldKind,
) -> std::result::Result<FieldValue, DataAccessError> {
    if matches!(column, ValueRef::Null) {
        return Ok(FieldValue::zero(kind));
    }
    match kind {
        FieldKind::Int8
        | FieldKind::UInt8
        | FieldKind::Int16
        | FieldKind::UInt16
        | FieldKind::Int32
        | FieldKind::UInt32
        | FieldKind::Int64
        | FieldKind::UInt64 => FieldValue::from_i64(kind, column_i64(column, kind)?),
        FieldKind::Float32 => Ok(FieldValue::Float32(column_f64(column, kind)? as f32)),
        FieldKind::Float64 => Ok(FieldValue::Float64(column_f64(column, kind)?)),
        FieldKind::Bool => Ok(FieldValue::Bool(column_i64(column, kind)? != 0)),
        FieldKind::String => Ok(FieldValue::String(match column {
            ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
            ValueRef::Integer(i) => i.to_string(),
            ValueRef::Real(f) => f.to_string(),
            ValueRef::Null => String::new(),
        })),
        FieldKind::ByteArray { element_width } => match column {
            ValueRef::Blob(b) | ValueRef::Text(b) => Ok(FieldValue::ByteArray {
                element_width,
                bytes: b.to_vec(),
            }),
            _ => Err(DataAccessError::TypeMismatch {
                expected: kind,
                actual: storage_kind(column),
            }),
        },
    }
}

fn column_i64(column: ValueRef<'_>, kind: FieldKind) -> std::result::Result<i64, DataAccessError> {
    match column {
        ValueRef::Integer(i) => Ok(i),
        ValueRef::Real(f) => Ok(f as i64),
        ValueRef::Text(t) => {
            let text = String::from_utf8_lossy(t);
            text.trim()
                .parse()
                .map_err(|_| DataAccessError::InvalidLiteral {
                    kind,
                    literal: text.into_owned(),
                })
        }
        ValueRef::Null => Ok(0),
        ValueRef::Blob(_) => Err(DataAccessError::TypeMismatch {
            expected: kind,
            actual: storage_kind(column),
        }),
    }
}

fn column_f64(column: ValueRef<'_>, kind: FieldKind) -> std::result::Result<f64, DataAccessError> {
    match column {
        ValueRef::Integer(i) => Ok(i as f64),
        ValueRef::Real(f) => Ok(f),
        ValueRef::Text(t) => {
            let text = String::from_utf8_lossy(t);
            text.trim()
                .parse()
                .map_err(|_| DataAccessError::InvalidLiteral {
                    kind,
                    literal: text.into_owned(),
                })
        }
        ValueRef::Null => Ok(0.0),
        ValueRef::Blob(_) => Err(DataAccessError::TypeMismatch {
            expected: kind,
            actual: storage_kind(column),
        }),
    }
}

/// Closest tag for a column's storage class, for mismatch reports
fn storage_kind(column: ValueRef<'_>) -> FieldKind {
    match column {
        ValueRef::Integer(_) | ValueRef::Null => FieldKind::Int64,
        ValueRef::Real(_) => FieldKind::Float64,
        ValueRef::Text(_) => FieldKind::String,
        ValueRef::Blob(_) => FieldKind::ByteArray { element_width: 1 },
    }
}

fn field_error(table: &str, field: &str, err: DataError) -> DataError {
    err.with_table(table.to_string()).with_field(field.to_string())
}

/// Bind every writable field of `record`, in column order, from index 1
///
/// Returns the number of parameters bound, which is where WHERE parameters
/// start.
///
/// # Errors
///
/// Returns the first bind failure after all fields have been attempted.
pub fn bind_record<R>(
    stmt: &mut Statement<'_>,
    schema: &RecordSchema<R>,
    record: &R,
) -> Result<usize> {
    let mut first_error = None;
    let mut bound = 0;
    for (offset, field) in schema.writable_fields().enumerate() {
        bound = offset + 1;
        let value = field.get(record);
        if let Err(e) = bind_value(stmt, offset + 1, &value) {
            tracing::error!(
                table = schema.type_name(),
                field = field.name(),
                error = %e,
                "cannot bind field"
            );
            if first_error.is_none() {
                first_error = Some(field_error(schema.type_name(), field.name(), from_rusqlite(e)));
            }
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(bound),
    }
}

/// Parse and bind WHERE parameters starting at the 1-based `first_index`
///
/// # Errors
///
/// Returns the first parse or bind failure after all parameters have been
/// attempted.
pub fn bind_parameters(
    stmt: &mut Statement<'_>,
    table: &str,
    parameters: &[QueryParameter],
    first_index: usize,
) -> Result<()> {
    let mut first_error: Option<DataError> = None;
    for (offset, parameter) in parameters.iter().enumerate() {
        let index = first_index + offset;
        let outcome = parameter
            .to_value()
            .map_err(DataError::from)
            .and_then(|value| bind_value(stmt, index, &value).map_err(from_rusqlite));
        if let Err(e) = outcome {
            tracing::error!(
                table = table,
                index = index,
                literal = %parameter.literal,
                error = %e,
                "cannot bind where parameter"
            );
            if first_error.is_none() {
                first_error = Some(e.with_table(table.to_string()));
            }
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Map the current row onto `record`, column `i` to field `i`
///
/// # Errors
///
/// Returns the first column failure after all fields have been attempted.
/// Fields that failed keep their previous value.
pub fn read_record<R>(row: &Row<'_>, schema: &RecordSchema<R>, record: &mut R) -> Result<()> {
    let mut first_error = None;
    for (index, field) in schema.fields().iter().enumerate() {
        let outcome = row
            .get_ref(index)
            .map_err(from_rusqlite)
            .and_then(|column| read_value(column, field.kind()).map_err(DataError::from))
            .and_then(|value| field.set(record, value).map_err(DataError::from));
        if let Err(e) = outcome {
            tracing::error!(
                table = schema.type_name(),
                field = field.name(),
                error = %e,
                "cannot read field"
            );
            if first_error.is_none() {
                first_error = Some(field_error(schema.type_name(), field.name(), e));
            }
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Map the named columns of the current row, in order, onto `record`
///
/// # Errors
///
/// Returns the first failure; see [`read_record`].
pub fn read_fields<R>(
    row: &Row<'_>,
    schema: &RecordSchema<R>,
    names: &[&str],
    record: &mut R,
) -> Result<()> {
    let mut first_error = None;
    for (index, name) in names.iter().enumerate() {
        let outcome = match schema.field(name) {
            Some(field) => row
                .get_ref(index)
                .map_err(from_rusqlite)
                .and_then(|column| read_value(column, field.kind()).map_err(DataError::from))
                .and_then(|value| field.set(record, value).map_err(DataError::from)),
            None => Err(DataError::from(DataAccessError::UnknownField {
                table: schema.type_name().to_string(),
                field: name.to_string(),
            })),
        };
        if let Err(e) = outcome {
            tracing::error!(table = schema.type_name(), field = *name, error = %e, "cannot read field");
            if first_error.is_none() {
                first_error = Some(field_error(schema.type_name(), name, e));
            }
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
