//! Data model for spans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a span. Sinks only ever see `Completed` records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpanStatus {
    Running,
    Completed,
}

/// Opaque reference to an open span, unique within one tracer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanHandle(pub(crate) u64);

impl std::fmt::Display for SpanHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One traced unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanRecord {
    /// Trace this span belongs to.
    pub trace_id: String,
    /// Unique span identifier.
    pub span_id: String,
    /// What the span measures, e.g. `secure_agent_execution`.
    #[serde(rename = "span_name")]
    pub name: String,
    pub start_time: DateTime<Utc>,
    /// Set when the span is sealed; never earlier than `start_time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub input: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    pub status: SpanStatus,
}

impl SpanRecord {
    pub(crate) fn open(trace_id: &str, name: &str, input: serde_json::Value) -> Self {
        Self {
            trace_id: trace_id.to_string(),
            span_id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            start_time: Utc::now(),
            end_time: None,
            input,
            output: None,
            status: SpanStatus::Running,
        }
    }

    /// Seal the span. Wall-clock time can step backwards, so the end time is
    /// clamped to the start time.
    pub(crate) fn seal(&mut self, output: serde_json::Value) {
        self.end_time = Some(Utc::now().max(self.start_time));
        self.output = Some(output);
        self.status = SpanStatus::Completed;
    }

    /// Duration in milliseconds, if sealed.
    pub fn duration_ms(&self) -> Option<i64> {
        self.end_time
            .map(|end| end.signed_duration_since(self.start_time).num_milliseconds())
    }
}
