//! Tagged field values and native conversions
//!
//! `FieldValue` is the currency between a record's native fields and the
//! statement layer. `FieldType` converts a native Rust type to and from it;
//! `BlobElement` describes how one array element is laid out inside a blob.

use serde::{Deserialize, Serialize};

use crate::errors::DataAccessError;
use crate::model::FieldKind;

/// A field value tagged with its semantic type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    String(String),
    /// Element buffer serialised as little-endian bytes
    ByteArray { element_width: usize, bytes: Vec<u8> },
}

impl FieldValue {
    /// The tag of this value
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Int8(_) => FieldKind::Int8,
            FieldValue::UInt8(_) => FieldKind::UInt8,
            FieldValue::Int16(_) => FieldKind::Int16,
            FieldValue::UInt16(_) => FieldKind::UInt16,
            FieldValue::Int32(_) => FieldKind::Int32,
            FieldValue::UInt32(_) => FieldKind::UInt32,
            FieldValue::Int64(_) => FieldKind::Int64,
            FieldValue::UInt64(_) => FieldKind::UInt64,
            FieldValue::Float32(_) => FieldKind::Float32,
            FieldValue::Float64(_) => FieldKind::Float64,
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::String(_) => FieldKind::String,
            FieldValue::ByteArray { element_width, .. } => FieldKind::ByteArray {
                element_width: *element_width,
            },
        }
    }

    /// The value a `NULL` column reads as
    pub fn zero(kind: FieldKind) -> FieldValue {
        match kind {
            FieldKind::Int8 => FieldValue::Int8(0),
            FieldKind::UInt8 => FieldValue::UInt8(0),
            FieldKind::Int16 => FieldValue::Int16(0),
            FieldKind::UInt16 => FieldValue::UInt16(0),
            FieldKind::Int32 => FieldValue::Int32(0),
            FieldKind::UInt32 => FieldValue::UInt32(0),
            FieldKind::Int64 => FieldValue::Int64(0),
            FieldKind::UInt64 => FieldValue::UInt64(0),
            FieldKind::Float32 => FieldValue::Float32(0.0),
            FieldKind::Float64 => FieldValue::Float64(0.0),
            FieldKind::Bool => FieldValue::Bool(false),
            FieldKind::String => FieldValue::String(String::new()),
            FieldKind::ByteArray { element_width } => FieldValue::ByteArray {
                element_width,
                bytes: Vec::new(),
            },
        }
    }

    /// Narrow a 64-bit integer column into an integer-tagged value
    ///
    /// `UInt64` is a bit reinterpretation of the stored `i64`, matching how it
    /// is bound. Every other integer tag is range checked.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` when the value does not fit the tag, or
    /// `UnsupportedType` when the tag is not an integer tag.
    pub fn from_i64(kind: FieldKind, value: i64) -> Result<FieldValue, DataAccessError> {
        let out_of_range = || DataAccessError::OutOfRange { kind, value };
        Ok(match kind {
            FieldKind::Int8 => FieldValue::Int8(i8::try_from(value).map_err(|_| out_of_range())?),
            FieldKind::UInt8 => {
                FieldValue::UInt8(u8::try_from(value).map_err(|_| out_of_range())?)
            }
            FieldKind::Int16 => {
                FieldValue::Int16(i16::try_from(value).map_err(|_| out_of_range())?)
            }
            FieldKind::UInt16 => {
                FieldValue::UInt16(u16::try_from(value).map_err(|_| out_of_range())?)
            }
            FieldKind::Int32 => {
                FieldValue::Int32(i32::try_from(value).map_err(|_| out_of_range())?)
            }
            FieldKind::UInt32 => {
                FieldValue::UInt32(u32::try_from(value).map_err(|_| out_of_range())?)
            }
            FieldKind::Int64 => FieldValue::Int64(value),
            FieldKind::UInt64 => FieldValue::UInt64(value as u64),
            other => {
                return Err(DataAccessError::UnsupportedType {
                    kind: other,
                    context: "integer column".to_string(),
                })
            }
        })
    }
}

/// Parse a WHERE literal into the native form of `kind`
///
/// Integers and floats are parsed from their decimal text, booleans accept
/// `true`/`false` or any integer (non-zero is true), strings are taken
/// verbatim. Byte arrays have no literal form.
///
/// # Errors
///
/// Returns `InvalidLiteral` for unparsable text and `UnsupportedType` for
/// byte arrays.
pub fn parse_literal(kind: FieldKind, literal: &str) -> Result<FieldValue, DataAccessError> {
    let invalid = || DataAccessError::InvalidLiteral {
        kind,
        literal: literal.to_string(),
    };
    let text = literal.trim();
    let value = match kind {
        FieldKind::Int8 => FieldValue::Int8(text.parse().map_err(|_| invalid())?),
        FieldKind::UInt8 => FieldValue::UInt8(text.parse().map_err(|_| invalid())?),
        FieldKind::Int16 => FieldValue::Int16(text.parse().map_err(|_| invalid())?),
        FieldKind::UInt16 => FieldValue::UInt16(text.parse().map_err(|_| invalid())?),
        FieldKind::Int32 => FieldValue::Int32(text.parse().map_err(|_| invalid())?),
        FieldKind::UInt32 => FieldValue::UInt32(text.parse().map_err(|_| invalid())?),
        FieldKind::Int64 => FieldValue::Int64(text.parse().map_err(|_| invalid())?),
        FieldKind::UInt64 => FieldValue::UInt64(text.parse().map_err(|_| invalid())?),
        FieldKind::Float32 => FieldValue::Float32(text.parse().map_err(|_| invalid())?),
        FieldKind::Float64 => FieldValue::Float64(text.parse().map_err(|_| invalid())?),
        FieldKind::Bool => {
            if text.eq_ignore_ascii_case("true") {
                FieldValue::Bool(true)
            } else if text.eq_ignore_ascii_case("false") {
                FieldValue::Bool(false)
            } else {
                let n: i64 = text.parse().map_err(|_| invalid())?;
                FieldValue::Bool(n != 0)
            }
        }
        FieldKind::String => FieldValue::String(literal.to_string()),
        FieldKind::ByteArray { .. } => {
            return Err(DataAccessError::UnsupportedType {
                kind,
                context: "where parameter".to_string(),
            })
        }
    };
    Ok(value)
}

/// A native Rust type that can back a record field
pub trait FieldType: Sized {
    /// The semantic tag for this type
    const KIND: FieldKind;

    fn to_field_value(&self) -> FieldValue;

    /// # Errors
    ///
    /// Returns `TypeMismatch` when `value` carries a different tag.
    fn from_field_value(value: FieldValue) -> Result<Self, DataAccessError>;
}

macro_rules! scalar_field_type {
    ($($native:ty => $variant:ident),+ $(,)?) => {
        $(
            impl FieldType for $native {
                const KIND: FieldKind = FieldKind::$variant;

                fn to_field_value(&self) -> FieldValue {
                    FieldValue::$variant(self.clone())
                }

                fn from_field_value(value: FieldValue) -> Result<Self, DataAccessError> {
                    match value {
                        FieldValue::$variant(v) => Ok(v),
                        other => Err(DataAccessError::TypeMismatch {
                            expected: Self::KIND,
                            actual: other.kind(),
                        }),
                    }
                }
            }
        )+
    };
}

scalar_field_type! {
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    bool => Bool,
    String => String,
}

/// Fixed-width element of a blob-backed array field
pub trait BlobElement: Sized {
    /// Byte width of one element
    const WIDTH: usize;

    fn write_le(&self, out: &mut Vec<u8>);

    /// Decode one element; `chunk` is exactly `WIDTH` bytes long
    fn read_le(chunk: &[u8]) -> Self;
}

macro_rules! blob_element {
    ($($native:ty),+ $(,)?) => {
        $(
            impl BlobElement for $native {
                const WIDTH: usize = std::mem::size_of::<$native>();

                fn write_le(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                fn read_le(chunk: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$native>()];
                    buf.copy_from_slice(chunk);
                    <$native>::from_le_bytes(buf)
                }
            }
        )+
    };
}

blob_element!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

impl<E: BlobElement> FieldType for Vec<E> {
    const KIND: FieldKind = FieldKind::ByteArray {
        element_width: E::WIDTH,
    };

    fn to_field_value(&self) -> FieldValue {
        let mut bytes = Vec::with_capacity(self.len() * E::WIDTH);
        for element in self {
            element.write_le(&mut bytes);
        }
        FieldValue::ByteArray {
            element_width: E::WIDTH,
            bytes,
        }
    }

    /// Rebuilds the array with `bytes.len() / WIDTH` elements; a trailing
    /// partial element is dropped.
    fn from_field_value(value: FieldValue) -> Result<Self, DataAccessError> {
        match value {
            FieldValue::ByteArray {
                element_width,
                bytes,
            } if element_width == E::WIDTH => {
                Ok(bytes.chunks_exact(E::WIDTH).map(E::read_le).collect())
            }
            other => Err(DataAccessError::TypeMismatch {
                expected: Self::KIND,
                actual: other.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_literals() {
        assert_eq!(
            parse_literal(FieldKind::Int32, "42").unwrap(),
            FieldValue::Int32(42)
        );
        assert_eq!(
            parse_literal(FieldKind::Int64, " -7 ").unwrap(),
            FieldValue::Int64(-7)
        );
        assert_eq!(
            parse_literal(FieldKind::UInt64, "18446744073709551615").unwrap(),
            FieldValue::UInt64(u64::MAX)
        );
    }

    #[test]
    fn test_parse_rejects_garbage_and_overflow() {
        let err = parse_literal(FieldKind::Int32, "forty-two").unwrap_err();
        assert!(matches!(err, DataAccessError::InvalidLiteral { .. }));

        let err = parse_literal(FieldKind::UInt8, "256").unwrap_err();
        assert!(matches!(err, DataAccessError::InvalidLiteral { .. }));
    }

    #[test]
    fn test_parse_bool_literals() {
        assert_eq!(
            parse_literal(FieldKind::Bool, "1").unwrap(),
            FieldValue::Bool(true)
        );
        assert_eq!(
            parse_literal(FieldKind::Bool, "0").unwrap(),
            FieldValue::Bool(false)
        );
        assert_eq!(
            parse_literal(FieldKind::Bool, "TRUE").unwrap(),
            FieldValue::Bool(true)
        );
    }

    #[test]
    fn test_parse_string_keeps_whitespace() {
        assert_eq!(
            parse_literal(FieldKind::String, " padded ").unwrap(),
            FieldValue::String(" padded ".to_string())
        );
    }

    #[test]
    fn test_byte_array_has_no_literal_form() {
        let err = parse_literal(FieldKind::ByteArray { element_width: 4 }, "42").unwrap_err();
        assert!(matches!(err, DataAccessError::UnsupportedType { .. }));
    }

    #[test]
    fn test_from_i64_range_checks() {
        assert_eq!(
            FieldValue::from_i64(FieldKind::Int8, -128).unwrap(),
            FieldValue::Int8(-128)
        );
        assert!(FieldValue::from_i64(FieldKind::Int8, 128).is_err());
        assert!(FieldValue::from_i64(FieldKind::UInt32, -1).is_err());
        assert_eq!(
            FieldValue::from_i64(FieldKind::UInt64, -1).unwrap(),
            FieldValue::UInt64(u64::MAX)
        );
        assert!(FieldValue::from_i64(FieldKind::String, 1).is_err());
    }

    #[test]
    fn test_array_serialises_element_width_bytes() {
        let value = vec![42i32, -1].to_field_value();
        match value {
            FieldValue::ByteArray {
                element_width,
                ref bytes,
            } => {
                assert_eq!(element_width, 4);
                assert_eq!(bytes.len(), 8);
                assert_eq!(&bytes[..4], &42i32.to_le_bytes());
            }
            other => panic!("unexpected value {:?}", other),
        }
        assert_eq!(Vec::<i32>::from_field_value(value).unwrap(), vec![42, -1]);
    }

    #[test]
    fn test_array_drops_trailing_partial_element() {
        let value = FieldValue::ByteArray {
            element_width: 2,
            bytes: vec![1, 0, 2, 0, 9],
        };
        assert_eq!(Vec::<u16>::from_field_value(value).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_array_width_mismatch_is_rejected() {
        let value = vec![1u8, 2, 3].to_field_value();
        let err = Vec::<i32>::from_field_value(value).unwrap_err();
        assert!(matches!(err, DataAccessError::TypeMismatch { .. }));
    }

    #[test]
    fn test_scalar_type_mismatch() {
        let err = i32::from_field_value(FieldValue::String("x".into())).unwrap_err();
        assert_eq!(
            err,
            DataAccessError::TypeMismatch {
                expected: FieldKind::Int32,
                actual: FieldKind::String,
            }
        );
    }

    #[test]
    fn test_zero_matches_kind() {
        for kind in [
            FieldKind::UInt16,
            FieldKind::Float64,
            FieldKind::String,
            FieldKind::ByteArray { element_width: 8 },
        ] {
            assert_eq!(FieldValue::zero(kind).kind(), kind);
        }
    }
}
