//! In-memory capture of `tracing` records for assertions.
//!
//! Tests install a [`LogSink`] as the thread-default subscriber and assert
//! on the captured records afterwards. Use current-thread tokio runtimes
//! (the `#[tokio::test]` default) so spawned tasks log to the same thread.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// One captured log record: level, message, and the structured fields.
#[derive(Debug, Clone)]
pub struct CapturedLog {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: BTreeMap<String, String>,
}

impl CapturedLog {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Shared handle to the captured records.
#[derive(Clone, Default)]
pub struct LogSink {
    records: Arc<Mutex<Vec<CapturedLog>>>,
}

impl LogSink {
    /// Install a capturing subscriber as the thread default. Capture stops
    /// when the returned guard is dropped.
    pub fn install() -> (LogSink, tracing::subscriber::DefaultGuard) {
        let sink = LogSink::default();
        let layer = CaptureLayer {
            records: Arc::clone(&sink.records),
        };
        let subscriber = tracing_subscriber::registry().with(layer);
        let guard = tracing::subscriber::set_default(subscriber);
        (sink, guard)
    }

    /// All records captured so far, in emission order.
    pub fn records(&self) -> Vec<CapturedLog> {
        self.records.lock().unwrap().clone()
    }

    pub fn any(&self, pred: impl Fn(&CapturedLog) -> bool) -> bool {
        self.records.lock().unwrap().iter().any(|r| pred(r))
    }

    pub fn count(&self, pred: impl Fn(&CapturedLog) -> bool) -> usize {
        self.records.lock().unwrap().iter().filter(|r| pred(r)).count()
    }

    /// Index of the first record matching the predicate.
    pub fn position(&self, pred: impl Fn(&CapturedLog) -> bool) -> Option<usize> {
        self.records.lock().unwrap().iter().position(|r| pred(r))
    }

    /// Poll (real time) until a matching record appears or the timeout
    /// elapses. Returns whether a match appeared.
    pub async fn wait_for(
        &self,
        pred: impl Fn(&CapturedLog) -> bool,
        timeout: Duration,
    ) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.any(&pred) {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    }
}

struct CaptureLayer {
    records: Arc<Mutex<Vec<CapturedLog>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        self.records.lock().unwrap().push(CapturedLog {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: BTreeMap<String, String>,
}

impl FieldVisitor {
    fn record(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record(field, value.to_string());
    }
}
