//! The span tracer.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::TraceError;
use crate::model::{SpanHandle, SpanRecord};
use crate::sink::SpanSink;

/// Opens and seals spans for one trace.
///
/// Thread-safe: open spans live behind an `RwLock`, handles come from an
/// atomic counter, so a tracer can be shared through `Arc`.
pub struct Tracer {
    trace_id: String,
    sink: Arc<dyn SpanSink>,
    open: RwLock<HashMap<SpanHandle, SpanRecord>>,
    next_handle: AtomicU64,
}

impl Tracer {
    pub fn new(trace_id: impl Into<String>, sink: Arc<dyn SpanSink>) -> Self {
        Self {
            trace_id: trace_id.into(),
            sink,
            open: RwLock::new(HashMap::new()),
            next_handle: AtomicU64::new(0),
        }
    }

    /// A tracer whose id is derived from the current time (`trace_<unix secs>`).
    pub fn with_timestamp_id(sink: Arc<dyn SpanSink>) -> Self {
        Self::new(format!("trace_{}", chrono::Utc::now().timestamp()), sink)
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Open a span. Nothing is written until the span ends.
    pub fn start_span(&self, name: &str, input: serde_json::Value) -> SpanHandle {
        let handle = SpanHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let record = SpanRecord::open(&self.trace_id, name, input);
        debug!(trace_id = %self.trace_id, span = name, %handle, "Span started");
        self.open
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(handle, record);
        handle
    }

    /// Seal a span and append it to the sink.
    ///
    /// Fails with [`TraceError::InvalidSpanHandle`] if the handle was never
    /// issued by this tracer or was already ended.
    pub fn end_span(
        &self,
        handle: SpanHandle,
        output: serde_json::Value,
    ) -> Result<SpanRecord, TraceError> {
        let mut record = self
            .open
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&handle)
            .ok_or(TraceError::InvalidSpanHandle(handle))?;

        record.seal(output);
        self.sink.append(&record)?;
        debug!(
            trace_id = %self.trace_id,
            span = %record.name,
            duration_ms = record.duration_ms().unwrap_or_default(),
            "Span completed"
        );
        Ok(record)
    }

    /// Number of spans started but not yet ended.
    pub fn open_spans(&self) -> usize {
        self.open.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpanStatus;
    use crate::sink::MemorySink;

    fn tracer() -> (Tracer, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (Tracer::new("trace_test", sink.clone()), sink)
    }

    #[test]
    fn sealed_record_count_matches_completed_spans() {
        let (tracer, sink) = tracer();
        let a = tracer.start_span("a", serde_json::json!(1));
        let b = tracer.start_span("b", serde_json::json!(2));
        let _c = tracer.start_span("c", serde_json::json!(3));

        tracer.end_span(b, serde_json::json!("done b")).unwrap();
        tracer.end_span(a, serde_json::json!("done a")).unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(tracer.open_spans(), 1);
        for r in &records {
            assert_eq!(r.status, SpanStatus::Completed);
            assert_eq!(r.trace_id, "trace_test");
            assert!(r.end_time.unwrap() >= r.start_time);
        }
        assert_eq!(records[0].name, "b");
    }

    #[test]
    fn ending_twice_is_rejected() {
        let (tracer, sink) = tracer();
        let h = tracer.start_span("once", serde_json::json!(null));
        tracer.end_span(h, serde_json::json!(null)).unwrap();
        let err = tracer.end_span(h, serde_json::json!(null)).unwrap_err();
        assert!(matches!(err, TraceError::InvalidSpanHandle(handle) if handle == h));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn foreign_handle_is_rejected() {
        let (first, _) = tracer();
        let (second, sink) = tracer();
        let _ = second.start_span("mine", serde_json::json!(null));
        let foreign = first.start_span("x", serde_json::json!(null));
        let foreign = SpanHandle(foreign.0 + 10);
        assert!(second.end_span(foreign, serde_json::json!(null)).is_err());
        assert!(sink.is_empty());
    }

    #[test]
    fn handles_are_unique() {
        let (tracer, _) = tracer();
        let handles: std::collections::HashSet<_> = (0..50)
            .map(|i| tracer.start_span("span", serde_json::json!(i)))
            .collect();
        assert_eq!(handles.len(), 50);
    }

    #[test]
    fn timestamp_trace_id() {
        let tracer = Tracer::with_timestamp_id(Arc::new(MemorySink::new()));
        assert!(tracer.trace_id().starts_with("trace_"));
    }
}
