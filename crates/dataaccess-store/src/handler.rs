//! Record mapper over one SQLite connection
//!
//! Every public operation consumes a `Query`, prepares exactly one statement
//! (plus the timestamp re-read after create / update), and owns its logging
//! boundary:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Expected outcomes (no row matched, nothing changed) come back as errors
//! whose kind reports `is_expected()`; they are logged at info.

use std::time::Instant;

use dataaccess_core::errors::{DataAccessError, DataError};
use dataaccess_core::model::{
    FieldValue, Record, RecordSchema, ID_FIELD, LAST_UPDATE_TIMESTAMP_FIELD,
};
use dataaccess_core::{log_op_end, log_op_error, log_op_start, Operator, Query};
use rusqlite::{Connection, Statement};

use crate::codec;
use crate::errors::{from_rusqlite, invalid_input, not_found, nothing_affected, Result};
use crate::resource::SqliteDataResource;
use crate::sql;

/// Maps records of any `Record` type to rows of the table named after it
#[derive(Debug, Clone, Copy)]
pub struct SqliteDataHandler<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteDataHandler<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Handler over an acquired resource
    ///
    /// # Errors
    ///
    /// Returns `ResourceUnavailable` when the resource is not acquired.
    pub fn from_resource(resource: &'c SqliteDataResource) -> Result<Self> {
        Ok(Self::new(resource.handle()?))
    }

    pub fn connection(&self) -> &'c Connection {
        self.conn
    }

    /// Insert `record` as a new row
    ///
    /// The generated row id is written into `Id`, then the declared
    /// timestamp fields are re-read from the stored row. The query's WHERE
    /// clause plays no part in an insert.
    ///
    /// # Errors
    ///
    /// `Persistence` for prepare or execute failures, codec errors for
    /// fields that cannot be bound or read back.
    pub fn create<R: Record>(&self, query: Query<R>, record: &mut R) -> Result<()> {
        let table = query.table();
        self.instrument("create", table, || self.create_impl(query.schema(), record))
            .map(|id| {
                tracing::debug!(table = table, id = id, "row inserted");
            })
    }

    fn create_impl<R>(&self, schema: &RecordSchema<R>, record: &mut R) -> Result<i64> {
        let table = schema.type_name();
        let insert = sql::insert(schema);
        let mut stmt = self.prepare("create", table, &insert)?;
        codec::bind_record(&mut stmt, schema, record)?;
        stmt.raw_execute()
            .map_err(|e| persistence("create", table, e))?;
        drop(stmt);

        let id = self.conn.last_insert_rowid();
        let id_field = schema
            .field(ID_FIELD)
            .ok_or_else(|| DataAccessError::UnknownField {
                table: table.to_string(),
                field: ID_FIELD.to_string(),
            })?;
        id_field.set(record, FieldValue::from_i64(id_field.kind(), id)?)?;

        let stamps: Vec<&str> = schema.timestamp_fields().map(|f| f.name()).collect();
        if stamps.is_empty() {
            return Ok(id);
        }
        let select = sql::select_timestamps_by_id(schema, &stamps);
        let mut stmt = self.prepare("create", table, &select)?;
        stmt.raw_bind_parameter(1, id)
            .map_err(|e| persistence("create", table, e))?;
        let mut rows = stmt.raw_query();
        match rows.next().map_err(|e| persistence("create", table, e))? {
            Some(row) => codec::read_fields(row, schema, &stamps, record)?,
            None => return Err(not_found("create", table)),
        }
        Ok(id)
    }

    /// Overwrite the writable fields of every row the query matches
    ///
    /// On success `LastUpdateTimestamp` (when declared) is re-read from the
    /// matched rows and written back into `record`.
    ///
    /// # Errors
    ///
    /// `NothingAffected` when no row matched. `NotFound` when the rows were
    /// changed but no longer match the filter, so the timestamp cannot be
    /// re-read; the change itself stays committed. `Persistence` and codec
    /// errors otherwise.
    pub fn update<R: Record>(&self, query: Query<R>, record: &mut R) -> Result<()> {
        let table = query.table();
        self.instrument("update", table, || self.update_impl(&query, record))
            .map(|changed| {
                tracing::debug!(table = table, rows = changed, "rows updated");
            })
    }

    fn update_impl<R: Record>(&self, query: &Query<R>, record: &mut R) -> Result<usize> {
        let schema = query.schema();
        let table = schema.type_name();
        let where_clause = query.where_clause();

        let update = sql::update(schema, &where_clause);
        let mut stmt = self.prepare("update", table, &update)?;
        let bound = codec::bind_record(&mut stmt, schema, record)?;
        codec::bind_parameters(&mut stmt, table, query.parameters(), bound + 1)?;
        let changed = stmt
            .raw_execute()
            .map_err(|e| persistence("update", table, e))?;
        drop(stmt);

        if changed == 0 {
            return Err(nothing_affected("update", table));
        }
        if !schema.has_field(LAST_UPDATE_TIMESTAMP_FIELD) {
            return Ok(changed);
        }

        let select = sql::select_last_update(schema, &where_clause);
        let mut stmt = self.prepare("update", table, &select)?;
        codec::bind_parameters(&mut stmt, table, query.parameters(), 1)?;
        let mut rows = stmt.raw_query();
        match rows.next().map_err(|e| persistence("update", table, e))? {
            Some(row) => {
                codec::read_fields(row, schema, &[LAST_UPDATE_TIMESTAMP_FIELD], record)?;
            }
            // The update itself moved the rows out of the filter
            None => {
                return Err(not_found("update", table).with_message(
                    "rows were updated but the timestamp re-read found no row",
                ))
            }
        }
        Ok(changed)
    }

    /// Remove every row the query matches; returns how many were removed
    ///
    /// # Errors
    ///
    /// `NothingAffected` when no row matched; `Persistence` otherwise.
    pub fn delete<R: Record>(&self, query: Query<R>) -> Result<usize> {
        let table = query.table();
        self.instrument("delete", table, || {
            let delete = sql::delete(query.schema(), &query.where_clause());
            let mut stmt = self.prepare("delete", table, &delete)?;
            codec::bind_parameters(&mut stmt, table, query.parameters(), 1)?;
            let changed = stmt
                .raw_execute()
                .map_err(|e| persistence("delete", table, e))?;
            if changed == 0 {
                return Err(nothing_affected("delete", table));
            }
            Ok(changed)
        })
    }

    /// Number of rows the query matches
    ///
    /// # Errors
    ///
    /// `NotFound` if the count query yields no row; `Persistence` otherwise.
    pub fn count<R: Record>(&self, query: Query<R>) -> Result<i64> {
        let table = query.table();
        self.instrument("count", table, || {
            let count = sql::count(query.schema(), &query.where_clause());
            let mut stmt = self.prepare("count", table, &count)?;
            codec::bind_parameters(&mut stmt, table, query.parameters(), 1)?;
            let mut rows = stmt.raw_query();
            let row = rows
                .next()
                .map_err(|e| persistence("count", table, e))?
                .ok_or_else(|| not_found("count", table))?;
            row.get::<_, i64>(0)
                .map_err(|e| persistence("count", table, e))
        })
    }

    /// Map the first matching row onto `record`
    ///
    /// # Errors
    ///
    /// `NotFound` when nothing matched, in which case `record` is untouched.
    /// A codec failure leaves the failing fields at their previous values.
    pub fn first<R: Record>(&self, query: Query<R>, record: &mut R) -> Result<()> {
        let table = query.table();
        self.instrument("first", table, || {
            let schema = query.schema();
            let select = sql::select(schema, &query.where_clause());
            let mut stmt = self.prepare("first", table, &select)?;
            codec::bind_parameters(&mut stmt, table, query.parameters(), 1)?;
            let mut rows = stmt.raw_query();
            let next = rows.next().map_err(|e| persistence("first", table, e))?;
            match next {
                Some(row) => codec::read_record(row, schema, record),
                None => Err(not_found("first", table)),
            }
        })
    }

    /// Map matching rows onto the existing slots of `records`, in order
    ///
    /// Returns the number of slots filled. Rows beyond the last slot are
    /// skipped with a warning; slots beyond the last row are left as they
    /// were.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty destination, `NotFound` when nothing
    /// matched, `Persistence` or codec errors otherwise. `records` is cleared
    /// on every error.
    pub fn get<R: Record>(&self, query: Query<R>, records: &mut Vec<R>) -> Result<usize> {
        let table = query.table();
        let result = self.instrument("get", table, || self.get_impl(&query, records));
        if result.is_err() {
            records.clear();
        }
        result
    }

    fn get_impl<R: Record>(&self, query: &Query<R>, records: &mut [R]) -> Result<usize> {
        let schema = query.schema();
        let table = schema.type_name();
        if records.is_empty() {
            return Err(invalid_input("get", "cannot get with an empty array").with_table(table));
        }

        let select = sql::select(schema, &query.where_clause());
        let mut stmt = self.prepare("get", table, &select)?;
        codec::bind_parameters(&mut stmt, table, query.parameters(), 1)?;
        let mut rows = stmt.raw_query();

        let capacity = records.len();
        let mut filled = 0;
        while let Some(row) = rows.next().map_err(|e| persistence("get", table, e))? {
            if filled == capacity {
                tracing::warn!(
                    table = table,
                    capacity = capacity,
                    "destination not large enough for all rows, {} returned",
                    filled
                );
                break;
            }
            codec::read_record(row, schema, &mut records[filled])?;
            filled += 1;
        }

        if filled == 0 {
            return Err(not_found("get", table));
        }
        Ok(filled)
    }

    /// Map the row with primary key `id` onto `record`
    ///
    /// # Errors
    ///
    /// See [`first`](Self::first).
    pub fn find_by_id<R: Record>(&self, id: i64, record: &mut R) -> Result<()> {
        self.first(Query::<R>::source().filter(ID_FIELD, Operator::Equals, id), record)
    }

    fn prepare(&self, op: &str, table: &str, sql: &str) -> Result<Statement<'c>> {
        tracing::debug!(op = op, table = table, sql = sql, "prepare");
        self.conn.prepare(sql).map_err(|e| persistence(op, table, e))
    }

    fn instrument<T>(&self, op: &str, table: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        log_op_start!(op, table = table);
        let start = Instant::now();
        let result = f();
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => {
                log_op_end!(op, duration_ms = duration_ms, table = table);
            }
            Err(e) => {
                log_op_error!(op, e.clone(), duration_ms = duration_ms, table = table);
            }
        }
        result
    }
}

fn persistence(op: &str, table: &str, err: rusqlite::Error) -> DataError {
    from_rusqlite(err).with_op(op.to_string()).with_table(table.to_string())
}
