//! Smoke command
//!
//! Usage: dataaccess smoke --db <FILE> [--init] [--json]
//!
//! Runs the full record lifecycle against the `TestObject` table: create,
//! read back, update, read back, second create, count, get all, delete, the
//! three expected-failure cases, and finally delete everything.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use dataaccess_core::{impl_record, DataError, DataErrorKind, Operator, Query};
use dataaccess_store::{SqliteDataHandler, SqliteDataResource};
use serde::Serialize;

/// Table layout the scenario runs against
pub const TEST_OBJECT_DDL: &str = "
CREATE TABLE IF NOT EXISTS TestObject (
    Id INTEGER PRIMARY KEY AUTOINCREMENT,
    TestInt INTEGER,
    TestFloat REAL,
    TestBool NUMERIC,
    TestString TEXT,
    TestArray BLOB,
    CreateTimestamp INTEGER,
    LastUpdateTimestamp INTEGER
);
CREATE TRIGGER IF NOT EXISTS TestObject_Insert AFTER INSERT ON TestObject
BEGIN
    UPDATE TestObject
    SET CreateTimestamp = strftime('%s', 'now'),
        LastUpdateTimestamp = strftime('%s', 'now')
    WHERE Id = NEW.Id;
END;
CREATE TRIGGER IF NOT EXISTS TestObject_Update
AFTER UPDATE OF TestInt, TestFloat, TestBool, TestString, TestArray ON TestObject
BEGIN
    UPDATE TestObject
    SET LastUpdateTimestamp = strftime('%s', 'now')
    WHERE Id = NEW.Id;
END;
";

#[derive(Debug, Args)]
pub struct SmokeArgs {
    /// Database file to run against
    #[arg(long, env = "DATAACCESS_DB")]
    pub db: PathBuf,

    /// Create the database file and the TestObject table if missing
    #[arg(long)]
    pub init: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct TestObject {
    id: i32,
    test_int: i32,
    test_float: f32,
    test_bool: bool,
    test_string: String,
    test_array: Vec<i32>,
    create_timestamp: i32,
    last_update_timestamp: i32,
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

impl TestObject {
    /// Field-wise comparison that ignores the engine-managed columns
    fn same_content(&self, other: &TestObject) -> bool {
        self.test_int == other.test_int
            && self.test_float == other.test_float
            && self.test_bool == other.test_bool
            && self.test_string == other.test_string
            && self.test_array == other.test_array
    }
}

#[derive(Debug, Serialize)]
pub struct StepOutcome {
    pub step: &'static str,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct SmokeReport {
    pub database: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub passed: bool,
    pub steps: Vec<StepOutcome>,
}

/// Step failure: which step, and why
struct StepFailure {
    step: &'static str,
    detail: String,
}

fn failed(step: &'static str, detail: impl Into<String>) -> StepFailure {
    StepFailure {
        step,
        detail: detail.into(),
    }
}

fn data_failure(step: &'static str) -> impl FnOnce(DataError) -> StepFailure {
    move |e| failed(step, e.to_string())
}

/// Expect an operation to fail with `kind`
fn expect_kind<T>(
    step: &'static str,
    result: Result<T, DataError>,
    kind: DataErrorKind,
) -> Result<String, StepFailure> {
    match result {
        Err(e) if e.kind() == kind => Ok(format!("failed as expected ({})", e.code())),
        Err(e) => Err(failed(step, format!("unexpected error: {}", e))),
        Ok(_) => Err(failed(step, "succeeded, but the record does not exist")),
    }
}

fn by_id(id: i32) -> Query<TestObject> {
    Query::<TestObject>::source().filter("Id", Operator::Equals, id)
}

/// Execute smoke command
pub fn execute(args: SmokeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let started_at = Utc::now();

    if !args.init && !args.db.exists() {
        return Err(format!("test database does not exist at {}", args.db.display()).into());
    }

    let mut resource = SqliteDataResource::new(&args.db);
    resource.acquire()?;
    if args.init {
        resource.handle()?.execute_batch(TEST_OBJECT_DDL)?;
    }

    let mut steps = Vec::new();
    let outcome = {
        let handler = SqliteDataHandler::from_resource(&resource)?;
        run_scenario(&handler, &mut steps)
    };
    if let Err(failure) = &outcome {
        steps.push(StepOutcome {
            step: failure.step,
            ok: false,
            detail: failure.detail.clone(),
        });
    }
    resource.release()?;

    let report = SmokeReport {
        database: resource.location(),
        started_at,
        finished_at: Utc::now(),
        passed: outcome.is_ok(),
        steps,
    };
    print_report(&report, args.json)?;

    match outcome {
        Ok(()) => Ok(()),
        Err(failure) => Err(format!("smoke test failed at step '{}'", failure.step).into()),
    }
}

fn run_scenario(
    handler: &SqliteDataHandler<'_>,
    steps: &mut Vec<StepOutcome>,
) -> Result<(), StepFailure> {
    let mut passed = |step: &'static str, detail: String| {
        tracing::info!(step = step, detail = %detail, "smoke step passed");
        steps.push(StepOutcome {
            step,
            ok: true,
            detail,
        });
    };

    let baseline = handler
        .count(Query::<TestObject>::source())
        .map_err(data_failure("baseline"))?;
    passed("baseline", format!("{} existing rows", baseline));

    let mut obj = TestObject {
        test_int: 42,
        test_float: 42.0,
        test_bool: true,
        test_string: "Test String".to_string(),
        test_array: vec![42],
        ..TestObject::default()
    };
    handler
        .create(Query::source(), &mut obj)
        .map_err(data_failure("create"))?;
    if obj.id <= 0 {
        return Err(failed("create", "record id not set after create"));
    }
    passed("create", format!("created record {}", obj.id));

    let mut read = TestObject::default();
    handler
        .first(by_id(obj.id), &mut read)
        .map_err(data_failure("read"))?;
    if !obj.same_content(&read) {
        return Err(failed("read", "created and read records do not match"));
    }
    passed("read", format!("record {} matches", obj.id));

    obj.test_int = 43;
    obj.test_float = 43.0;
    obj.test_bool = false;
    obj.test_string = "Another Test String".to_string();
    obj.test_array.push(43);
    handler
        .update(by_id(obj.id), &mut obj)
        .map_err(data_failure("update"))?;

    let mut read = TestObject::default();
    handler
        .first(by_id(obj.id), &mut read)
        .map_err(data_failure("update"))?;
    if !obj.same_content(&read) {
        return Err(failed("update", "updated and read records do not match"));
    }
    passed("update", format!("record {} updated", obj.id));

    handler
        .create(Query::source(), &mut read)
        .map_err(data_failure("second_create"))?;
    passed("second_create", format!("created record {}", read.id));

    let count = handler
        .count(Query::<TestObject>::source())
        .map_err(data_failure("count"))?;
    if count != baseline + 2 {
        return Err(failed(
            "count",
            format!("expected {} rows, found {}", baseline + 2, count),
        ));
    }
    passed("count", format!("{} rows", count));

    let capacity = usize::try_from(count).map_err(|e| failed("get_all", e.to_string()))?;
    let mut all = vec![TestObject::default(); capacity];
    let filled = handler
        .get(Query::<TestObject>::source(), &mut all)
        .map_err(data_failure("get_all"))?;
    if filled != capacity {
        return Err(failed(
            "get_all",
            format!("expected {} records, got {}", capacity, filled),
        ));
    }
    passed("get_all", format!("{} records", filled));

    handler
        .delete(by_id(obj.id))
        .map_err(data_failure("delete"))?;
    passed("delete", format!("deleted record {}", obj.id));

    let mut missing = TestObject::default();
    let detail = expect_kind(
        "missing_read",
        handler.first(by_id(-1), &mut missing),
        DataErrorKind::NotFound,
    )?;
    passed("missing_read", detail);

    let detail = expect_kind(
        "missing_update",
        handler.update(by_id(-1), &mut missing),
        DataErrorKind::NothingAffected,
    )?;
    passed("missing_update", detail);

    let detail = expect_kind(
        "missing_delete",
        handler.delete(by_id(-1)),
        DataErrorKind::NothingAffected,
    )?;
    passed("missing_delete", detail);

    let removed = handler
        .delete(Query::<TestObject>::source())
        .map_err(data_failure("cleanup"))?;
    passed("cleanup", format!("deleted {} rows", removed));

    Ok(())
}

fn print_report(report: &SmokeReport, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Smoke test against {}", report.database);
    for step in &report.steps {
        let mark = if step.ok { "✓" } else { "✗" };
        println!("{} {:<15} {}", mark, step.step, step.detail);
    }
    let elapsed = report.finished_at - report.started_at;
    println!(
        "{} in {} ms",
        if report.passed { "Passed" } else { "Failed" },
        elapsed.num_milliseconds()
    );
    Ok(())
}
