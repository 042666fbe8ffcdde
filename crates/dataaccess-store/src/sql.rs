//! SQL text for each mapper operation
//!
//! The table name is the record type name. Column lists follow schema order.
//! `where_clause` is the output of `Query::where_clause()` and may be empty.

use dataaccess_core::model::{RecordSchema, ID_FIELD, LAST_UPDATE_TIMESTAMP_FIELD};

fn with_where(statement: String, where_clause: &str) -> String {
    if where_clause.is_empty() {
        statement
    } else {
        format!("{} {}", statement, where_clause)
    }
}

/// `INSERT INTO T (a, b) VALUES (?, ?)` over the writable fields
pub fn insert<R>(schema: &RecordSchema<R>) -> String {
    let columns: Vec<&str> = schema.writable_fields().map(|f| f.name()).collect();
    if columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", schema.type_name());
    }
    let placeholders = vec!["?"; columns.len()];
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.type_name(),
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// `UPDATE T SET a = ?, b = ? <where>` over the writable fields
pub fn update<R>(schema: &RecordSchema<R>, where_clause: &str) -> String {
    let sets: Vec<String> = schema
        .writable_fields()
        .map(|f| format!("{} = ?", f.name()))
        .collect();
    with_where(
        format!("UPDATE {} SET {}", schema.type_name(), sets.join(", ")),
        where_clause,
    )
}

pub fn delete<R>(schema: &RecordSchema<R>, where_clause: &str) -> String {
    with_where(format!("DELETE FROM {}", schema.type_name()), where_clause)
}

pub fn count<R>(schema: &RecordSchema<R>, where_clause: &str) -> String {
    with_where(
        format!("SELECT COUNT({}) FROM {}", ID_FIELD, schema.type_name()),
        where_clause,
    )
}

/// `SELECT <every field> FROM T <where>`
pub fn select<R>(schema: &RecordSchema<R>, where_clause: &str) -> String {
    let columns: Vec<&str> = schema.fields().iter().map(|f| f.name()).collect();
    with_where(
        format!("SELECT {} FROM {}", columns.join(", "), schema.type_name()),
        where_clause,
    )
}

/// Re-read the declared timestamp columns of one row after an insert
pub fn select_timestamps_by_id<R>(schema: &RecordSchema<R>, columns: &[&str]) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = ?",
        columns.join(", "),
        schema.type_name(),
        ID_FIELD
    )
}

/// Re-read the update timestamp of the rows an update matched
pub fn select_last_update<R>(schema: &RecordSchema<R>, where_clause: &str) -> String {
    with_where(
        format!(
            "SELECT DISTINCT {} FROM {}",
            LAST_UPDATE_TIMESTAMP_FIELD,
            schema.type_name()
        ),
        where_clause,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataaccess_core::model::Record;

    #[derive(Default)]
    struct TestObject {
        id: i32,
        test_int: i32,
        test_string: String,
        create_timestamp: i32,
        last_update_timestamp: i32,
    }

    dataaccess_core::impl_record!(TestObject {
        "Id" => id,
        "TestInt" => test_int,
        "TestString" => test_string,
        "CreateTimestamp" => create_timestamp,
        "LastUpdateTimestamp" => last_update_timestamp,
    });

    #[derive(Default)]
    struct Bare {
        id: i64,
    }

    dataaccess_core::impl_record!(Bare { "Id" => id });

    #[test]
    fn test_insert_skips_managed_columns() {
        assert_eq!(
            insert(TestObject::schema()),
            "INSERT INTO TestObject (TestInt, TestString) VALUES (?, ?)"
        );
        assert_eq!(insert(Bare::schema()), "INSERT INTO Bare DEFAULT VALUES");
    }

    #[test]
    fn test_update_appends_where() {
        assert_eq!(
            update(TestObject::schema(), "WHERE Id = ?"),
            "UPDATE TestObject SET TestInt = ?, TestString = ? WHERE Id = ?"
        );
        assert_eq!(
            update(TestObject::schema(), ""),
            "UPDATE TestObject SET TestInt = ?, TestString = ?"
        );
    }

    #[test]
    fn test_select_lists_every_field() {
        assert_eq!(
            select(TestObject::schema(), ""),
            "SELECT Id, TestInt, TestString, CreateTimestamp, LastUpdateTimestamp FROM TestObject"
        );
    }

    #[test]
    fn test_count_and_delete() {
        assert_eq!(
            count(TestObject::schema(), "WHERE TestInt > ?"),
            "SELECT COUNT(Id) FROM TestObject WHERE TestInt > ?"
        );
        assert_eq!(delete(TestObject::schema(), ""), "DELETE FROM TestObject");
    }

    #[test]
    fn test_timestamp_queries() {
        assert_eq!(
            select_timestamps_by_id(
                TestObject::schema(),
                &["CreateTimestamp", "LastUpdateTimestamp"]
            ),
            "SELECT CreateTimestamp, LastUpdateTimestamp FROM TestObject WHERE Id = ?"
        );
        assert_eq!(
            select_last_update(TestObject::schema(), "WHERE Id = ?"),
            "SELECT DISTINCT LastUpdateTimestamp FROM TestObject WHERE Id = ?"
        );
    }
}
