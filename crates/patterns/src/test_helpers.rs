//! Shared test gateways for pattern tests.

use agentweave_core::error::GatewayError;
use agentweave_core::gateway::{Completion, CompletionRequest, Gateway, ToolCallRequest};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// A gateway that replays a script of completions in order and records
/// every request it receives.
///
/// Panics if more calls are made than responses provided.
pub struct ScriptedGateway {
    responses: Mutex<Vec<Result<Completion, GatewayError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGateway {
    pub fn new(responses: Vec<Result<Completion, GatewayError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A script of plain text replies.
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(Completion::text(*t))).collect())
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// All requests received so far, in call order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The last user message text of the n-th request.
    pub fn user_input(&self, n: usize) -> String {
        self.requests.lock().unwrap()[n]
            .last_user_text()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Gateway for ScriptedGateway {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, GatewayError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let n = requests.len();

        if n >= responses.len() {
            panic!(
                "ScriptedGateway: no more responses (call #{}, have {})",
                n,
                responses.len()
            );
        }

        requests.push(request);
        responses[n].clone()
    }
}

/// A gateway that answers by system prompt (or by user message), after a
/// per-key delay.
///
/// Records the order in which replies complete, so tests can compare
/// completion order with result order.
pub struct PersonaGateway {
    replies: HashMap<String, (Duration, Result<String, GatewayError>)>,
    by_user: HashMap<String, (Duration, String)>,
    fallback: String,
    completed: Mutex<Vec<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl PersonaGateway {
    pub fn new(fallback: &str) -> Self {
        Self {
            replies: HashMap::new(),
            by_user: HashMap::new(),
            fallback: fallback.into(),
            completed: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(mut self, system_prompt: &str, delay_ms: u64, text: &str) -> Self {
        self.replies.insert(
            system_prompt.into(),
            (Duration::from_millis(delay_ms), Ok(text.into())),
        );
        self
    }

    pub fn fail(mut self, system_prompt: &str, delay_ms: u64, error: GatewayError) -> Self {
        self.replies
            .insert(system_prompt.into(), (Duration::from_millis(delay_ms), Err(error)));
        self
    }

    /// Answer a user message, whatever the system prompt. Checked first.
    pub fn reply_to_user(mut self, user_text: &str, delay_ms: u64, text: &str) -> Self {
        self.by_user
            .insert(user_text.into(), (Duration::from_millis(delay_ms), text.into()));
        self
    }

    /// Keys (system prompt or user message) in the order their replies completed.
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Gateway for PersonaGateway {
    fn name(&self) -> &str {
        "persona"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        let user = request.last_user_text().unwrap_or_default();
        if let Some((delay, reply)) = self.by_user.get(&user) {
            tokio::time::sleep(*delay).await;
            self.completed.lock().unwrap().push(user);
            return Ok(Completion::text(reply.clone()));
        }

        let system = request.system_prompt().unwrap_or_default();

        let Some((delay, reply)) = self.replies.get(&system) else {
            return Ok(Completion::text(self.fallback.clone()));
        };

        tokio::time::sleep(*delay).await;
        self.completed.lock().unwrap().push(system);
        reply.clone().map(Completion::text)
    }
}

/// Helper to create a tool call.
pub fn make_tool_call(id: &str, name: &str, args: serde_json::Value) -> ToolCallRequest {
    ToolCallRequest {
        id: id.into(),
        tool_name: name.into(),
        arguments: args,
    }
}

/// A completion that requests the given tool calls.
pub fn tool_calls(calls: Vec<ToolCallRequest>) -> Result<Completion, GatewayError> {
    Ok(Completion::ToolCalls { calls })
}
