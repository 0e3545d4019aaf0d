//! Message and Conversation domain types.
//!
//! These are the value objects that flow through every pattern runner:
//! a runner builds a conversation → the gateway completes it → tool results
//! are appended → the conversation is replayed.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::gateway::ToolCallRequest;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (persona, rules)
    System,
    /// The end user
    User,
    /// The model
    Assistant,
    /// Tool execution result
    Tool,
}

/// Message content: plain text, or an ordered list of typed parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One part of structured content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { url: String },
}

impl Content {
    /// The textual view of this content. Text parts are joined with a newline;
    /// image parts are skipped.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Parts(parts) => parts.is_empty(),
        }
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl std::fmt::Display for Content {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The content
    pub content: Content,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,

    /// If this is a tool result, which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn new(role: Role, content: Content) -> Self {
        Self {
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<Content>) -> Self {
        Self::new(Role::User, content.into())
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<Content>) -> Self {
        Self::new(Role::Assistant, content.into())
    }

    /// Create a new system message.
    pub fn system(content: impl Into<Content>) -> Self {
        Self::new(Role::System, content.into())
    }

    /// Create an assistant message that carries tool call requests.
    pub fn assistant_tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::new(Role::Assistant, Content::Text(String::new()))
        }
    }

    /// Create a tool result message.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<Content>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new(Role::Tool, content.into())
        }
    }

    /// The textual view of this message's content.
    pub fn text(&self) -> String {
        self.content.as_text()
    }
}

/// An ordered, append-only transcript for one exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// A conversation with a leading system prompt and one user message.
    pub fn with_system(system: impl Into<Content>, user: impl Into<Content>) -> Self {
        Self {
            messages: vec![Message::system(system), Message::user(user)],
        }
    }

    /// Add a message to the conversation.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// IDs of tool calls that do not have exactly one tool-result message
    /// carrying the same ID, in request order.
    ///
    /// Each assistant message's calls must be answered before the next
    /// assistant message, so a provider may reuse an ID in a later turn.
    pub fn unanswered_tool_calls(&self) -> Vec<String> {
        let mut unanswered = Vec::new();
        for (i, message) in self.messages.iter().enumerate() {
            if message.tool_calls.is_empty() {
                continue;
            }
            let exchange: Vec<&Message> = self.messages[i + 1..]
                .iter()
                .take_while(|m| m.role != Role::Assistant)
                .filter(|m| m.role == Role::Tool)
                .collect();
            for call in &message.tool_calls {
                let answers = exchange
                    .iter()
                    .filter(|m| m.tool_call_id.as_deref() == Some(call.id.as_str()))
                    .count();
                if answers != 1 {
                    unanswered.push(call.id.clone());
                }
            }
        }
        unanswered
    }

    /// Fail if any tool call is unanswered; checked before every replay.
    pub fn ensure_tool_calls_answered(&self) -> Result<(), Error> {
        match self.unanswered_tool_calls().into_iter().next() {
            Some(id) => Err(Error::UnansweredToolCall(id)),
            None => Ok(()),
        }
    }

    /// The most recent assistant message, if any.
    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }
}
