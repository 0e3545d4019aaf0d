//! Span tracing for agentweave.
//!
//! A [`Tracer`] opens spans for units of work (a secure execution, a
//! pattern run) and seals them on completion. Every sealed span is appended
//! exactly once to a [`SpanSink`]: a JSONL file in production, memory in
//! tests.

pub mod model;
pub mod sink;
pub mod tracer;

pub use model::{SpanHandle, SpanRecord, SpanStatus};
pub use sink::{JsonlSink, MemorySink, SpanSink};
pub use tracer::Tracer;

/// Errors from the tracing subsystem.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("unknown or already ended span handle: {0}")]
    InvalidSpanHandle(SpanHandle),

    #[error("trace sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
