//! Error facility
//!
//! `DataError` is what every mapper operation returns. `DataAccessError`
//! is the narrower failure of a single field conversion; it converts into
//! `DataError` at the record boundary.

use std::fmt;

use thiserror::Error;

use crate::model::FieldKind;

pub type Result<T> = std::result::Result<T, DataError>;

/// Classification of a `DataError`
///
/// `NotFound` and `NothingAffected` are outcomes of a well-formed request
/// that matched nothing; the rest are faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataErrorKind {
    InvalidInput,
    UnknownField,
    UnsupportedType,
    TypeMismatch,
    InvalidLiteral,
    OutOfRange,
    /// A SELECT / COUNT matched no row
    NotFound,
    /// An UPDATE / DELETE changed zero rows
    NothingAffected,
    Persistence,
    ResourceUnavailable,
}

impl DataErrorKind {
    /// Stable code for matching without parsing messages
    pub fn code(&self) -> &'static str {
        use DataErrorKind::*;
        match self {
            InvalidInput => "ERR_INVALID_INPUT",
            UnknownField => "ERR_UNKNOWN_FIELD",
            UnsupportedType => "ERR_UNSUPPORTED_TYPE",
            TypeMismatch => "ERR_TYPE_MISMATCH",
            InvalidLiteral => "ERR_INVALID_LITERAL",
            OutOfRange => "ERR_OUT_OF_RANGE",
            NotFound => "ERR_NOT_FOUND",
            NothingAffected => "ERR_NOTHING_AFFECTED",
            Persistence => "ERR_PERSISTENCE",
            ResourceUnavailable => "ERR_RESOURCE_UNAVAILABLE",
        }
    }

    pub fn is_expected(&self) -> bool {
        matches!(self, DataErrorKind::NotFound | DataErrorKind::NothingAffected)
    }
}

/// Where a failure happened
#[derive(Debug, Clone, Default)]
struct Site {
    op: Option<String>,
    table: Option<String>,
    field: Option<String>,
}

/// Structured operation error
///
/// Built up with the `with_*` methods as it travels outwards; the innermost
/// layer sets the message, outer layers add the operation and table.
#[derive(Debug, Clone)]
pub struct DataError {
    kind: DataErrorKind,
    site: Site,
    message: String,
    cause: Option<Box<DataError>>,
}

impl DataError {
    pub fn new(kind: DataErrorKind) -> Self {
        DataError {
            kind,
            site: Site::default(),
            message: String::new(),
            cause: None,
        }
    }

    pub fn with_op(self, op: impl Into<String>) -> Self {
        let op = Some(op.into());
        DataError {
            site: Site { op, ..self.site },
            ..self
        }
    }

    pub fn with_table(self, table: impl Into<String>) -> Self {
        let table = Some(table.into());
        DataError {
            site: Site { table, ..self.site },
            ..self
        }
    }

    pub fn with_field(self, field: impl Into<String>) -> Self {
        let field = Some(field.into());
        DataError {
            site: Site { field, ..self.site },
            ..self
        }
    }

    pub fn with_message(self, message: impl Into<String>) -> Self {
        DataError {
            message: message.into(),
            ..self
        }
    }

    /// Chain the lower-level error this one wraps
    pub fn with_source(self, source: DataError) -> Self {
        DataError {
            cause: Some(Box::new(source)),
            ..self
        }
    }

    pub fn kind(&self) -> DataErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn is_expected(&self) -> bool {
        self.kind.is_expected()
    }

    pub fn op(&self) -> Option<&str> {
        self.site.op.as_deref()
    }

    pub fn table(&self) -> Option<&str> {
        self.site.table.as_deref()
    }

    pub fn field(&self) -> Option<&str> {
        self.site.field.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&DataError> {
        self.cause.as_deref()
    }
}

/// `[CODE] op on Table.Field: message`, omitting the parts that are unset
impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.code())?;
        let Site { op, table, field } = &self.site;
        match (op, table) {
            (Some(op), Some(table)) => write!(f, " '{}' on {}", op, table)?,
            (Some(op), None) => write!(f, " '{}'", op)?,
            (None, Some(table)) => write!(f, " on {}", table)?,
            (None, None) => {}
        }
        if let Some(field) = field {
            write!(f, "{}{}", if table.is_some() { "." } else { " field " }, field)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Field-level failures raised by the value codec and the record schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataAccessError {
    /// The tag has no representation in the requested direction
    #[error("type {kind} is not supported for {context}")]
    UnsupportedType { kind: FieldKind, context: String },

    /// A value of one tag was handed to a field of another
    #[error("expected a {expected} value, got {actual}")]
    TypeMismatch {
        expected: FieldKind,
        actual: FieldKind,
    },

    /// A WHERE literal could not be parsed into the field's native form
    #[error("literal {literal:?} is not a valid {kind}")]
    InvalidLiteral { kind: FieldKind, literal: String },

    /// An integer column does not fit the field's width
    #[error("value {value} is out of range for {kind}")]
    OutOfRange { kind: FieldKind, value: i64 },

    /// The record type has no field with this name
    #[error("field {field:?} does not exist in record type {table:?}")]
    UnknownField { table: String, field: String },
}

impl DataAccessError {
    /// The canonical kind this failure is reported under
    pub fn kind(&self) -> DataErrorKind {
        match self {
            DataAccessError::UnsupportedType { .. } => DataErrorKind::UnsupportedType,
            DataAccessError::TypeMismatch { .. } => DataErrorKind::TypeMismatch,
            DataAccessError::InvalidLiteral { .. } => DataErrorKind::InvalidLiteral,
            DataAccessError::OutOfRange { .. } => DataErrorKind::OutOfRange,
            DataAccessError::UnknownField { .. } => DataErrorKind::UnknownField,
        }
    }
}

impl From<DataAccessError> for DataError {
    fn from(err: DataAccessError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        let converted = DataError::new(kind).with_message(message);
        match err {
            DataAccessError::UnknownField { table, field } => {
                converted.with_table(table).with_field(field)
            }
            _ => converted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (DataErrorKind::NotFound, "ERR_NOT_FOUND"),
            (DataErrorKind::NothingAffected, "ERR_NOTHING_AFFECTED"),
            (DataErrorKind::Persistence, "ERR_PERSISTENCE"),
            (DataErrorKind::UnsupportedType, "ERR_UNSUPPORTED_TYPE"),
            (DataErrorKind::InvalidLiteral, "ERR_INVALID_LITERAL"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_expected_outcomes() {
        assert!(DataErrorKind::NotFound.is_expected());
        assert!(DataErrorKind::NothingAffected.is_expected());
        assert!(!DataErrorKind::Persistence.is_expected());
        assert!(!DataErrorKind::TypeMismatch.is_expected());
    }

    #[test]
    fn test_display_includes_context() {
        let err = DataError::new(DataErrorKind::NothingAffected)
            .with_op("update")
            .with_table("TestObject")
            .with_message("nothing to update");
        let text = err.to_string();
        assert_eq!(
            text,
            "[ERR_NOTHING_AFFECTED] 'update' on TestObject: nothing to update"
        );

        let err = DataError::new(DataErrorKind::OutOfRange)
            .with_table("TestObject")
            .with_field("TestInt");
        assert_eq!(err.to_string(), "[ERR_OUT_OF_RANGE] on TestObject.TestInt");
    }

    #[test]
    fn test_unknown_field_conversion_keeps_context() {
        let err: DataError = DataAccessError::UnknownField {
            table: "TestObject".to_string(),
            field: "Missing".to_string(),
        }
        .into();
        assert_eq!(err.kind(), DataErrorKind::UnknownField);
        assert_eq!(err.table(), Some("TestObject"));
        assert_eq!(err.field(), Some("Missing"));
    }

    #[test]
    fn test_codec_error_conversion_keeps_message() {
        let err: DataError = DataAccessError::InvalidLiteral {
            kind: FieldKind::Int32,
            literal: "abc".to_string(),
        }
        .into();
        assert_eq!(err.code(), "ERR_INVALID_LITERAL");
        assert!(err.message().contains("abc"));
        assert!(err.message().contains("int32"));
    }
}
