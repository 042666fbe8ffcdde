//! Event recorder for assertions on emitted logs
//!
//! The recorder is installed as the global subscriber the first time a test
//! asks for it. All tests of one binary share the same buffer, so filter on
//! something the test owns (a unique op name, table or literal).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::schema::{FIELD_EVENT, FIELD_OP};

/// One recorded event; every field is kept in its display form
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub op: Option<String>,
    pub event: Option<String>,
    pub message: Option<String>,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn is(&self, op: &str, event: &str) -> bool {
        self.op.as_deref() == Some(op) && self.event.as_deref() == Some(event)
    }
}

/// Collects an event's fields as strings
#[derive(Default)]
struct Recorder(BTreeMap<String, String>);

impl Recorder {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for Recorder {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }
}

type Buffer = Arc<Mutex<Vec<CapturedEvent>>>;

struct CaptureLayer {
    buffer: Buffer,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut recorder = Recorder::default();
        event.record(&mut recorder);
        let fields = recorder.0;

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            message: fields.get("message").cloned(),
            fields,
        };
        if let Ok(mut events) = self.buffer.lock() {
            events.push(captured);
        }
    }
}

/// Read side of the recorder
#[derive(Clone, Default)]
pub struct TestCapture {
    buffer: Buffer,
}

impl TestCapture {
    fn lock(&self) -> MutexGuard<'_, Vec<CapturedEvent>> {
        // A test that panicked mid-push leaves the data intact
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.lock().clone()
    }

    pub fn find(&self, predicate: impl Fn(&CapturedEvent) -> bool) -> Option<CapturedEvent> {
        self.lock().iter().find(|e| predicate(e)).cloned()
    }

    pub fn count_events(&self, predicate: impl Fn(&CapturedEvent) -> bool) -> usize {
        self.lock().iter().filter(|e| predicate(e)).count()
    }

    /// # Panics
    ///
    /// Panics when no recorded event carries both `op` and `event`.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.lock();
        if !events.iter().any(|e| e.is(op, event)) {
            panic!(
                "no event with op={} event={} among {} recorded",
                op,
                event,
                events.len()
            );
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

static RECORDER: OnceLock<TestCapture> = OnceLock::new();

/// Install the recorder as the global subscriber on first call
///
/// ```
/// use dataaccess_core::logging_facility::init_test_capture;
/// use dataaccess_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_operation");
/// capture.assert_event_exists("doc_operation", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    RECORDER
        .get_or_init(|| {
            let capture = TestCapture::default();
            let layer = CaptureLayer {
                buffer: Arc::clone(&capture.buffer),
            };
            // Another subscriber may already be global; the handle then stays empty
            let _ = tracing_subscriber::registry().with(layer).try_init();
            capture
        })
        .clone()
}
