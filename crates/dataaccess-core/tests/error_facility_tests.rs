use dataaccess_core::errors::{DataAccessError, DataError, DataErrorKind};
use dataaccess_core::model::{FieldKind, FieldType, FieldValue};

#[test]
fn test_codec_failures_map_to_stable_codes() {
    let cases = [
        (
            DataAccessError::UnsupportedType {
                kind: FieldKind::ByteArray { element_width: 4 },
                context: "where parameter".to_string(),
            },
            "ERR_UNSUPPORTED_TYPE",
        ),
        (
            DataAccessError::TypeMismatch {
                expected: FieldKind::Bool,
                actual: FieldKind::String,
            },
            "ERR_TYPE_MISMATCH",
        ),
        (
            DataAccessError::OutOfRange {
                kind: FieldKind::UInt8,
                value: 300,
            },
            "ERR_OUT_OF_RANGE",
        ),
    ];

    for (err, code) in cases {
        let data_err: DataError = err.into();
        assert_eq!(data_err.code(), code);
        assert!(!data_err.is_expected());
    }
}

#[test]
fn test_setter_failure_reports_both_tags() {
    let err = bool::from_field_value(FieldValue::String("yes".to_string())).unwrap_err();
    let data_err: DataError = err.into();

    assert_eq!(data_err.kind(), DataErrorKind::TypeMismatch);
    assert!(data_err.message().contains("bool"));
    assert!(data_err.message().contains("string"));
}

#[test]
fn test_error_chain_exposes_source() {
    use std::error::Error;

    let root = DataError::new(DataErrorKind::Persistence).with_message("disk I/O error");
    let err = DataError::new(DataErrorKind::Persistence)
        .with_op("create")
        .with_table("TestObject")
        .with_source(root);

    assert_eq!(err.source_error().unwrap().message(), "disk I/O error");
    assert!(err.source().unwrap().to_string().contains("disk I/O error"));
    assert_eq!(err.op(), Some("create"));
}

#[test]
fn test_expected_outcomes_are_distinct_from_faults() {
    let not_found = DataError::new(DataErrorKind::NotFound);
    let nothing = DataError::new(DataErrorKind::NothingAffected);
    let fault = DataError::new(DataErrorKind::ResourceUnavailable);

    assert!(not_found.is_expected());
    assert!(nothing.is_expected());
    assert!(!fault.is_expected());
    assert_ne!(not_found.code(), nothing.code());
}
