#![allow(dead_code)]

use dataaccess_core::impl_record;
use dataaccess_store::SqliteDataResource;

/// Mirrors the table created by `TEST_OBJECT_DDL`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestObject {
    pub id: i32,
    pub test_int: i32,
    pub test_float: f32,
    pub test_bool: bool,
    pub test_string: String,
    pub test_array: Vec<i32>,
    pub create_timestamp: i32,
    pub last_update_timestamp: i32,
}

impl_record!(TestObject {
    "Id" => id,
    "TestInt" => test_int,
    "TestFloat" => test_float,
    "TestBool" => test_bool,
    "TestString" => test_string,
    "TestArray" => test_array,
    "CreateTimestamp" => create_timestamp,
    "LastUpdateTimestamp" => last_update_timestamp,
});

/// A record type without timestamp columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plain {
    pub id: i64,
    pub label: String,
    pub weight: f64,
    pub flags: u8,
    pub big: u64,
    pub samples: Vec<u16>,
}

impl_record!(Plain {
    "Id" => id,
    "Label" => label,
    "Weight" => weight,
    "Flags" => flags,
    "Big" => big,
    "Samples" => samples,
});

pub const TEST_OBJECT_DDL: &str = "
CREATE TABLE TestObject (
    Id INTEGER PRIMARY KEY AUTOINCREMENT,
    TestInt INTEGER,
    TestFloat REAL,
    TestBool NUMERIC,
    TestString TEXT,
    TestArray BLOB,
    CreateTimestamp INTEGER,
    LastUpdateTimestamp INTEGER
);
CREATE TRIGGER TestObject_Insert AFTER INSERT ON TestObject
BEGIN
    UPDATE TestObject
    SET CreateTimestamp = strftime('%s', 'now'),
        LastUpdateTimestamp = strftime('%s', 'now')
    WHERE Id = NEW.Id;
END;
CREATE TRIGGER TestObject_Update AFTER UPDATE OF TestInt, TestFloat, TestBool, TestString, TestArray ON TestObject
BEGIN
    UPDATE TestObject
    SET LastUpdateTimestamp = strftime('%s', 'now')
    WHERE Id = NEW.Id;
END;
";

pub const PLAIN_DDL: &str = "
CREATE TABLE Plain (
    Id INTEGER PRIMARY KEY AUTOINCREMENT,
    Label TEXT,
    Weight REAL,
    Flags INTEGER,
    Big INTEGER,
    Samples BLOB
);
";

/// In-memory resource with both fixture tables created
pub fn setup_resource() -> SqliteDataResource {
    let mut resource = SqliteDataResource::in_memory();
    resource.acquire().unwrap();
    resource
        .handle()
        .unwrap()
        .execute_batch(TEST_OBJECT_DDL)
        .unwrap();
    resource.handle().unwrap().execute_batch(PLAIN_DDL).unwrap();
    resource
}

/// The record the original smoke scenario starts from
pub fn sample_object() -> TestObject {
    TestObject {
        test_int: 42,
        test_float: 42.0,
        test_bool: true,
        test_string: "Test String".to_string(),
        test_array: vec![42],
        ..TestObject::default()
    }
}

pub fn object_with_int(test_int: i32) -> TestObject {
    TestObject {
        test_int,
        test_string: format!("row {}", test_int),
        ..TestObject::default()
    }
}
