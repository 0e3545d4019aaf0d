//! Error types for the agentweave domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] unifies them for
//! pattern runners.

use thiserror::Error;

/// The top-level error type for all pattern runner operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Gateway errors (never retried, never masked) ---
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Structured output errors ---
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    // --- Transcript invariants ---
    #[error("Tool call {0} has no tool-result message")]
    UnansweredToolCall(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// A network or provider failure from the LLM gateway.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Gateway not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Expected a text completion, got {0} tool call(s)")]
    UnexpectedToolCalls(usize),
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool '{0}' not found.")]
    UnknownTool(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    Execution { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool already registered: {0}")]
    DuplicateTool(String),
}

/// A malformed structured response (planner list, evaluator verdict, ...).
///
/// Always recovered at the call site with a fixed fallback.
#[derive(Debug, Clone, Error)]
#[error("could not decode {what}: {reason}")]
pub struct DecodeError {
    /// What was being decoded (e.g. "plan", "verdict").
    pub what: &'static str,
    /// Why decoding failed.
    pub reason: String,
}

impl DecodeError {
    pub fn new(what: &'static str, reason: impl Into<String>) -> Self {
        Self {
            what,
            reason: reason.into(),
        }
    }
}
