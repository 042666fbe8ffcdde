//! Semantic type tags

use serde::{Deserialize, Serialize};

/// The semantic type of a record field
///
/// The tag decides how a value is bound as a statement parameter and how a
/// result column is read back into the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    #[serde(rename = "int8")]
    Int8,
    #[serde(rename = "uint8")]
    UInt8,
    #[serde(rename = "int16")]
    Int16,
    #[serde(rename = "uint16")]
    UInt16,
    #[serde(rename = "int32")]
    Int32,
    #[serde(rename = "uint32")]
    UInt32,
    #[serde(rename = "int64")]
    Int64,
    #[serde(rename = "uint64")]
    UInt64,
    #[serde(rename = "float32")]
    Float32,
    #[serde(rename = "float64")]
    Float64,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "string")]
    String,
    /// Variable-length array stored as one contiguous blob
    #[serde(rename = "byte-array")]
    ByteArray {
        /// Byte width of a single array element
        element_width: usize,
    },
}

impl FieldKind {
    /// Canonical lowercase name used in messages and logs
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Int8 => "int8",
            FieldKind::UInt8 => "uint8",
            FieldKind::Int16 => "int16",
            FieldKind::UInt16 => "uint16",
            FieldKind::Int32 => "int32",
            FieldKind::UInt32 => "uint32",
            FieldKind::Int64 => "int64",
            FieldKind::UInt64 => "uint64",
            FieldKind::Float32 => "float32",
            FieldKind::Float64 => "float64",
            FieldKind::Bool => "bool",
            FieldKind::String => "string",
            FieldKind::ByteArray { .. } => "byte-array",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::ByteArray { element_width } => {
                write!(f, "{}[{}]", self.name(), element_width)
            }
            _ => f.write_str(self.name()),
        }
    }
}
