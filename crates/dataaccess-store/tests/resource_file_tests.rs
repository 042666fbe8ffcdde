#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{sample_object, TestObject, TEST_OBJECT_DDL};
use dataaccess_core::{DataErrorKind, Query};
use dataaccess_store::{SqliteDataHandler, SqliteDataResource};
use tempfile::TempDir;

#[test]
fn test_rows_persist_across_reacquire() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let mut resource = SqliteDataResource::new(&db_path);
    resource.acquire().unwrap();
    resource.handle().unwrap().execute_batch(TEST_OBJECT_DDL).unwrap();

    let mut obj = sample_object();
    {
        let handler = SqliteDataHandler::from_resource(&resource).unwrap();
        handler.create(Query::source(), &mut obj).unwrap();
    }
    resource.release().unwrap();
    assert!(resource.handle().is_err());

    resource.acquire().unwrap();
    let handler = SqliteDataHandler::from_resource(&resource).unwrap();
    let mut read = TestObject::default();
    handler.find_by_id(i64::from(obj.id), &mut read).unwrap();
    assert_eq!(read, obj);
}

#[test]
fn test_handler_requires_acquired_resource() {
    let temp_dir = TempDir::new().unwrap();
    let resource = SqliteDataResource::new(temp_dir.path().join("idle.db"));

    let err = SqliteDataHandler::from_resource(&resource).unwrap_err();
    assert_eq!(err.kind(), DataErrorKind::ResourceUnavailable);
}

#[test]
fn test_drop_releases_connection() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("drop.db");

    {
        let mut resource = SqliteDataResource::new(&db_path);
        resource.acquire().unwrap();
        resource.handle().unwrap().execute_batch(TEST_OBJECT_DDL).unwrap();
    }

    let mut resource = SqliteDataResource::new(&db_path);
    resource.acquire().unwrap();
    let handler = SqliteDataHandler::from_resource(&resource).unwrap();
    assert_eq!(handler.count(Query::<TestObject>::source()).unwrap(), 0);
}

#[test]
fn test_missing_table_is_persistence_error() {
    let mut resource = SqliteDataResource::in_memory();
    resource.acquire().unwrap();
    let handler = SqliteDataHandler::from_resource(&resource).unwrap();

    let err = handler
        .create(Query::source(), &mut sample_object())
        .unwrap_err();
    assert_eq!(err.kind(), DataErrorKind::Persistence);
    assert!(err.message().contains("no such table"));
}
