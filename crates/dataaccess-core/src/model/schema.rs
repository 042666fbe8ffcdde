//! Record type descriptors

use crate::errors::DataAccessError;
use crate::model::{FieldKind, FieldValue};

/// Primary key column, also receives the generated row id on create
pub const ID_FIELD: &str = "Id";
/// Maintained by the database schema on insert
pub const CREATE_TIMESTAMP_FIELD: &str = "CreateTimestamp";
/// Maintained by the database schema on insert and update
pub const LAST_UPDATE_TIMESTAMP_FIELD: &str = "LastUpdateTimestamp";

/// Getter from a record into a tagged value
pub type FieldGetter<R> = fn(&R) -> FieldValue;
/// Setter from a tagged value into a record
pub type FieldSetter<R> = fn(&mut R, FieldValue) -> Result<(), DataAccessError>;

/// One column of a record type: name, semantic tag and accessors
pub struct FieldDescriptor<R> {
    name: &'static str,
    kind: FieldKind,
    getter: FieldGetter<R>,
    setter: FieldSetter<R>,
}

impl<R> FieldDescriptor<R> {
    pub fn new(
        name: &'static str,
        kind: FieldKind,
        getter: FieldGetter<R>,
        setter: FieldSetter<R>,
    ) -> Self {
        Self {
            name,
            kind,
            getter,
            setter,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Read this field out of `record`
    pub fn get(&self, record: &R) -> FieldValue {
        (self.getter)(record)
    }

    /// Write `value` into this field of `record`
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` when `value` does not carry this field's tag.
    pub fn set(&self, record: &mut R, value: FieldValue) -> Result<(), DataAccessError> {
        (self.setter)(record, value)
    }

    /// Whether the engine, not the caller, owns this column's value
    pub fn is_managed(&self) -> bool {
        matches!(
            self.name,
            ID_FIELD | CREATE_TIMESTAMP_FIELD | LAST_UPDATE_TIMESTAMP_FIELD
        )
    }
}

impl<R> Clone for FieldDescriptor<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            kind: self.kind,
            getter: self.getter,
            setter: self.setter,
        }
    }
}

impl<R> std::fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Ordered field list of a record type
///
/// The type name doubles as the table name and field order is column order.
#[derive(Debug, Clone)]
pub struct RecordSchema<R> {
    type_name: &'static str,
    fields: Vec<FieldDescriptor<R>>,
}

impl<R> RecordSchema<R> {
    /// # Panics
    ///
    /// Panics if two fields share a name.
    pub fn new(type_name: &'static str, fields: Vec<FieldDescriptor<R>>) -> Self {
        for (i, field) in fields.iter().enumerate() {
            assert!(
                fields[..i].iter().all(|f| f.name != field.name),
                "record type `{}` declares field `{}` twice",
                type_name,
                field.name
            );
        }
        Self { type_name, fields }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldDescriptor<R>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor<R>> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Fields the caller supplies on insert and update, in column order
    pub fn writable_fields(&self) -> impl Iterator<Item = &FieldDescriptor<R>> {
        self.fields.iter().filter(|f| !f.is_managed())
    }

    /// Declared timestamp fields, in column order
    pub fn timestamp_fields(&self) -> impl Iterator<Item = &FieldDescriptor<R>> {
        self.fields.iter().filter(|f| {
            f.name == CREATE_TIMESTAMP_FIELD || f.name == LAST_UPDATE_TIMESTAMP_FIELD
        })
    }

    /// Write `value` into the named field of `record`
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` when the type has no such field, or the
    /// setter's `TypeMismatch`.
    pub fn set_field(
        &self,
        record: &mut R,
        name: &str,
        value: FieldValue,
    ) -> Result<(), DataAccessError> {
        let field = self
            .field(name)
            .ok_or_else(|| DataAccessError::UnknownField {
                table: self.type_name.to_string(),
                field: name.to_string(),
            })?;
        field.set(record, value)
    }
}

/// A record type persisted one row per instance
///
/// Implementations are normally generated by [`impl_record!`].
///
/// [`impl_record!`]: crate::impl_record
pub trait Record: Sized + 'static {
    fn schema() -> &'static RecordSchema<Self>;
}

/// Implement [`Record`] for a struct by listing its columns
///
/// Each entry maps a column name to a struct field whose type implements
/// [`FieldType`](crate::model::FieldType). The table name defaults to the
/// struct name; `as "Table"` overrides it.
///
/// ```
/// use dataaccess_core::impl_record;
/// use dataaccess_core::model::Record;
///
/// #[derive(Default)]
/// struct Player {
///     id: i64,
///     name: String,
///     scores: Vec<i32>,
/// }
///
/// impl_record!(Player {
///     "Id" => id,
///     "Name" => name,
///     "Scores" => scores,
/// });
///
/// assert_eq!(Player::schema().type_name(), "Player");
/// assert_eq!(Player::schema().fields().len(), 3);
/// ```
#[macro_export]
macro_rules! impl_record {
    (@impl $record:ident, $table:expr, { $($column:literal => $field:ident),+ }) => {
        impl $crate::model::Record for $record {
            fn schema() -> &'static $crate::model::RecordSchema<Self> {
                static SCHEMA: ::std::sync::OnceLock<$crate::model::RecordSchema<$record>> =
                    ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    $crate::model::RecordSchema::new(
                        $table,
                        vec![
                            $(
                                $crate::model::FieldDescriptor::new(
                                    $column,
                                    $crate::model::schema::kind_of(|r: &$record| &r.$field),
                                    |r: &$record| $crate::model::FieldType::to_field_value(&r.$field),
                                    |r: &mut $record, value| {
                                        r.$field = $crate::model::FieldType::from_field_value(value)?;
                                        Ok(())
                                    },
                                ),
                            )+
                        ],
                    )
                })
            }
        }
    };
    ($record:ident { $($column:literal => $field:ident),+ $(,)? }) => {
        $crate::impl_record!(@impl $record, stringify!($record), { $($column => $field),+ });
    };
    ($record:ident as $table:literal { $($column:literal => $field:ident),+ $(,)? }) => {
        $crate::impl_record!(@impl $record, $table, { $($column => $field),+ });
    };
}

/// Tag of the field an accessor points at; used by [`impl_record!`]
#[doc(hidden)]
pub fn kind_of<R, T: crate::model::FieldType>(_accessor: fn(&R) -> &T) -> FieldKind {
    T::KIND
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldType;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Sample {
        id: i32,
        label: String,
        ratio: f64,
        create_timestamp: i64,
        last_update_timestamp: i64,
    }

    crate::impl_record!(Sample {
        "Id" => id,
        "Label" => label,
        "Ratio" => ratio,
        "CreateTimestamp" => create_timestamp,
        "LastUpdateTimestamp" => last_update_timestamp,
    });

    #[test]
    fn test_schema_preserves_column_order() {
        let names: Vec<_> = Sample::schema().fields().iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            ["Id", "Label", "Ratio", "CreateTimestamp", "LastUpdateTimestamp"]
        );
        assert_eq!(Sample::schema().type_name(), "Sample");
    }

    #[test]
    fn test_kinds_follow_native_types() {
        let schema = Sample::schema();
        assert_eq!(schema.field("Id").unwrap().kind(), FieldKind::Int32);
        assert_eq!(schema.field("Label").unwrap().kind(), FieldKind::String);
        assert_eq!(schema.field("Ratio").unwrap().kind(), FieldKind::Float64);
    }

    #[test]
    fn test_writable_fields_skip_managed_columns() {
        let names: Vec<_> = Sample::schema()
            .writable_fields()
            .map(|f| f.name())
            .collect();
        assert_eq!(names, ["Label", "Ratio"]);

        let stamps: Vec<_> = Sample::schema()
            .timestamp_fields()
            .map(|f| f.name())
            .collect();
        assert_eq!(stamps, ["CreateTimestamp", "LastUpdateTimestamp"]);
    }

    #[test]
    fn test_accessors_read_and_write() {
        let schema = Sample::schema();
        let mut sample = Sample::default();
        schema
            .set_field(&mut sample, "Label", FieldValue::String("hello".into()))
            .unwrap();
        assert_eq!(sample.label, "hello");
        assert_eq!(
            schema.field("Label").unwrap().get(&sample),
            "hello".to_string().to_field_value()
        );
    }

    #[test]
    fn test_set_field_rejects_wrong_tag_and_unknown_name() {
        let schema = Sample::schema();
        let mut sample = Sample::default();

        let err = schema
            .set_field(&mut sample, "Ratio", FieldValue::Int32(1))
            .unwrap_err();
        assert!(matches!(err, DataAccessError::TypeMismatch { .. }));
        assert_eq!(sample, Sample::default());

        let err = schema
            .set_field(&mut sample, "Nope", FieldValue::Int32(1))
            .unwrap_err();
        assert!(matches!(err, DataAccessError::UnknownField { .. }));
    }

    #[derive(Default)]
    struct Renamed {
        id: i64,
    }

    crate::impl_record!(Renamed as "renamed_rows" { "Id" => id });

    #[test]
    fn test_table_name_override() {
        assert_eq!(Renamed::schema().type_name(), "renamed_rows");
        assert_eq!(Renamed::default().id, 0);
    }

    #[test]
    #[should_panic(expected = "twice")]
    fn test_duplicate_field_names_panic() {
        fn get(_: &Sample) -> FieldValue {
            FieldValue::Int32(0)
        }
        fn set(_: &mut Sample, _: FieldValue) -> Result<(), DataAccessError> {
            Ok(())
        }
        let _ = RecordSchema::new(
            "Dup",
            vec![
                FieldDescriptor::new("Id", FieldKind::Int32, get, set),
                FieldDescriptor::new("Id", FieldKind::Int32, get, set),
            ],
        );
    }
}
