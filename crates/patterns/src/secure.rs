//! Secure executor: one traced, cached, redacted gateway call.

use agentweave_cache::ResponseCache;
use agentweave_core::error::GatewayError;
use agentweave_core::gateway::{Completion, CompletionRequest, Gateway};
use agentweave_core::message::Message;
use agentweave_guardrails::redact;
use agentweave_telemetry::{SpanHandle, SpanRecord, TraceError, Tracer};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

const SPAN_NAME: &str = "secure_agent_execution";

#[derive(Debug, Error)]
pub enum SecureError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Trace(#[from] TraceError),
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Llm,
}

impl ResponseSource {
    fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Llm => "llm",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SecureOutcome {
    /// The response with PII redacted.
    pub response: String,
    pub source: ResponseSource,
    /// The sealed span for this execution.
    pub record: SpanRecord,
}

/// Wraps a gateway call with a span, an exact-prompt cache and the PII
/// output filter.
///
/// The cache is keyed on the user query and stores the unredacted reply.
/// Redaction runs before anything leaves the executor: the traced span
/// output and the returned response, hits included.
pub struct SecureExecutor {
    gateway: Arc<dyn Gateway>,
    cache: Arc<ResponseCache>,
    tracer: Arc<Tracer>,
    prompt_suffix: Option<String>,
    temperature: f32,
}

impl SecureExecutor {
    pub fn new(gateway: Arc<dyn Gateway>, cache: Arc<ResponseCache>, tracer: Arc<Tracer>) -> Self {
        Self {
            gateway,
            cache,
            tracer,
            prompt_suffix: None,
            temperature: 0.7,
        }
    }

    /// Text appended to the query before it is sent (not part of the cache key).
    pub fn with_prompt_suffix(mut self, suffix: Option<String>) -> Self {
        self.prompt_suffix = suffix;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub async fn execute(&self, query: &str) -> Result<SecureOutcome, SecureError> {
        let span = self.tracer.start_span(SPAN_NAME, json!(query));

        if let Some(cached) = self.cache.get(query) {
            info!(trace_id = %self.tracer.trace_id(), "Cache hit, skipping gateway");
            return self.finish(span, &cached, ResponseSource::Cache);
        }

        let prompt = match &self.prompt_suffix {
            Some(suffix) => format!("{query}{suffix}"),
            None => query.to_string(),
        };
        let request =
            CompletionRequest::new(vec![Message::user(prompt)]).with_temperature(self.temperature);

        let response = match self.gateway.complete(request).await.and_then(Completion::into_text) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Gateway call failed inside traced execution");
                self.tracer
                    .end_span(span, json!({"source": "error", "error": e.to_string()}))?;
                return Err(e.into());
            }
        };

        self.cache.insert(query, response.as_str());
        self.finish(span, &response, ResponseSource::Llm)
    }

    fn finish(&self, span: SpanHandle, raw: &str, source: ResponseSource) -> Result<SecureOutcome, SecureError> {
        let response = redact(raw);
        let record = self
            .tracer
            .end_span(span, json!({"source": source.as_str(), "response": response}))?;
        info!(source = source.as_str(), "Secure execution finished");
        Ok(SecureOutcome {
            response,
            source,
            record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedGateway;
    use agentweave_telemetry::{MemorySink, SpanStatus};

    const REPLY: &str = "Sure, I can help. Contact support at admin@company.com for details.";

    fn setup(gateway: Arc<ScriptedGateway>) -> (SecureExecutor, Arc<MemorySink>, Arc<ResponseCache>) {
        let sink = Arc::new(MemorySink::new());
        let tracer = Arc::new(Tracer::new("trace_test", sink.clone()));
        let cache = Arc::new(ResponseCache::new());
        (SecureExecutor::new(gateway, cache.clone(), tracer), sink, cache)
    }

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let gateway = Arc::new(ScriptedGateway::texts(&[REPLY]));
        let (executor, sink, cache) = setup(gateway.clone());

        let first = executor.execute("How do I reset my password?").await.unwrap();
        let second = executor.execute("How do I reset my password?").await.unwrap();

        assert_eq!(first.source, ResponseSource::Llm);
        assert_eq!(second.source, ResponseSource::Cache);
        assert_eq!(gateway.call_count(), 1);
        assert_eq!(cache.stats().hits, 1);

        let expected = "Sure, I can help. Contact support at [REDACTED_EMAIL] for details.";
        assert_eq!(first.response, expected);
        assert_eq!(second.response, expected);

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.name == "secure_agent_execution"));
        assert!(records.iter().all(|r| r.status == SpanStatus::Completed));
        assert_eq!(records[1].output.as_ref().unwrap()["source"], "cache");
        assert_eq!(cache.get("How do I reset my password?").as_deref(), Some(REPLY));
    }

    #[tokio::test]
    async fn traced_response_is_redacted_on_both_paths() {
        let gateway = Arc::new(ScriptedGateway::texts(&[REPLY]));
        let (executor, sink, _cache) = setup(gateway);

        executor.execute("Who do I email?").await.unwrap();
        executor.execute("Who do I email?").await.unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 2);
        for record in &records {
            let output = record.output.as_ref().unwrap();
            assert_eq!(
                output["response"],
                "Sure, I can help. Contact support at [REDACTED_EMAIL] for details."
            );
            assert!(!output.to_string().contains("admin@company.com"));
        }
    }

    #[tokio::test]
    async fn configured_temperature_is_sent() {
        let gateway = Arc::new(ScriptedGateway::texts(&["ok"]));
        let (executor, _sink, _cache) = setup(gateway.clone());
        executor.with_temperature(0.1).execute("hi").await.unwrap();
        assert_eq!(gateway.requests()[0].temperature, 0.1);
    }

    #[tokio::test]
    async fn suffix_is_sent_but_not_cached_under() {
        let gateway = Arc::new(ScriptedGateway::texts(&["ok"]));
        let (executor, _sink, cache) = setup(gateway.clone());
        let executor =
            executor.with_prompt_suffix(Some(". Include a contact email in your response.".into()));

        executor.execute("Help").await.unwrap();
        assert_eq!(
            gateway.user_input(0),
            "Help. Include a contact email in your response."
        );
        assert_eq!(cache.get("Help").as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn gateway_failure_seals_span_then_propagates() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Err(GatewayError::Network(
            "connection refused".into(),
        ))]));
        let (executor, sink, cache) = setup(gateway);

        let err = executor.execute("hi").await.unwrap_err();
        assert!(matches!(err, SecureError::Gateway(GatewayError::Network(_))));

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].output.as_ref().unwrap()["source"], "error");
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn tool_calls_are_a_gateway_error_here() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(Completion::ToolCalls { calls: vec![] })]));
        let (executor, sink, _cache) = setup(gateway);
        let err = executor.execute("hi").await.unwrap_err();
        assert!(matches!(err, SecureError::Gateway(GatewayError::UnexpectedToolCalls(0))));
        assert_eq!(sink.len(), 1);
    }
}
