//! Gateway trait: the single entry point for LLM generation.
//!
//! A Gateway takes a role-tagged message sequence plus optional tool
//! declarations and returns either free text or a list of tool-call requests.
//! There is no retry or backoff: a transport or provider failure surfaces to
//! the caller as a [`GatewayError`].
//!
//! Implementations: OpenAI-compatible HTTP, offline simulation, test scripts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::message::Message;

/// A request to complete a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The conversation messages
    pub messages: Vec<Message>,

    /// Tools the model may call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDeclaration>,

    /// Temperature (0.0 approximates deterministic output)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Ask the provider for a JSON object response
    #[serde(default)]
    pub json_mode: bool,

    /// Model override; the gateway's own default is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            temperature: default_temperature(),
            json_mode: false,
            model: None,
            max_tokens: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDeclaration>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// The system prompt of this request (first system message), if any.
    pub fn system_prompt(&self) -> Option<String> {
        self.messages
            .iter()
            .find(|m| m.role == crate::message::Role::System)
            .map(|m| m.text())
    }

    /// The text of the last user message, if any.
    pub fn last_user_text(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::message::Role::User)
            .map(|m| m.text())
    }
}

/// A tool declaration sent to the LLM so it knows what it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    /// The tool name, unique within a registry
    pub name: String,

    /// What the tool does
    pub description: String,

    /// JSON Schema describing the tool's arguments
    pub input_schema: serde_json::Value,
}

/// A request from the model to execute one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Correlation ID; the tool-result message must carry the same ID
    pub id: String,

    /// Name of the tool to execute
    pub tool_name: String,

    /// Named arguments
    pub arguments: serde_json::Value,
}

/// The outcome of one gateway call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Completion {
    Text { content: String },
    ToolCalls { calls: Vec<ToolCallRequest> },
}

impl Completion {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Extract the text, failing if the model asked for tools instead.
    pub fn into_text(self) -> Result<String, GatewayError> {
        match self {
            Self::Text { content } => Ok(content),
            Self::ToolCalls { calls } => Err(GatewayError::UnexpectedToolCalls(calls.len())),
        }
    }
}

/// The core Gateway trait.
///
/// Must be safe for concurrent use: scatter-gather shares one gateway across
/// all branches.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// A human-readable name (e.g., "openai", "offline").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, GatewayError>;
}

/// The common two-message call: one system prompt, one user message, text out.
pub async fn ask(
    gateway: &dyn Gateway,
    system: &str,
    user: &str,
    temperature: f32,
    json_mode: bool,
) -> Result<String, GatewayError> {
    let request = CompletionRequest::new(vec![Message::system(system), Message::user(user)])
        .with_temperature(temperature)
        .with_json_mode(json_mode);
    gateway.complete(request).await?.into_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoGateway;

    #[async_trait]
    impl Gateway for EchoGateway {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<Completion, GatewayError> {
            let system = request.system_prompt().unwrap_or_default();
            let user = request.last_user_text().unwrap_or_default();
            Ok(Completion::text(format!(
                "{system}|{user}|{}|{}",
                request.temperature, request.json_mode
            )))
        }
    }

    #[test]
    fn request_defaults() {
        let req = CompletionRequest::new(vec![]);
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert!(!req.json_mode);
        assert!(req.tools.is_empty());
    }

    #[test]
    fn tool_calls_are_not_text() {
        let completion = Completion::ToolCalls {
            calls: vec![ToolCallRequest {
                id: "call_1".into(),
                tool_name: "get_news".into(),
                arguments: serde_json::json!({}),
            }],
        };
        let err = completion.into_text().unwrap_err();
        assert!(matches!(err, GatewayError::UnexpectedToolCalls(1)));
    }

    #[test]
    fn completion_serializes_with_kind_tag() {
        let json = serde_json::to_value(Completion::text("done")).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "text", "content": "done"}));
    }

    #[tokio::test]
    async fn ask_builds_system_and_user_messages() {
        let out = ask(&EchoGateway, "You are a Chef.", "Dinner for 2", 0.0, true)
            .await
            .unwrap();
        assert_eq!(out, "You are a Chef.|Dinner for 2|0|true");
    }
}
