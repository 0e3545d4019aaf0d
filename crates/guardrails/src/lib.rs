//! Guardrails for agentweave: PII detection and redaction.
//!
//! Provides:
//! - **Redaction**: replace emails, phone numbers and payment card numbers
//!   with fixed sentinels
//! - **Scanning**: per-category match counts without rewriting
//! - **Composition**: explicit helpers that apply redaction to message
//!   content, to a whole request (input rail), or to a gateway reply

pub mod guard;
pub mod pii;

pub use guard::{guarded, redact_content, redact_messages};
pub use pii::{PiiCategory, PiiReport, Redactor, redact, scan};
