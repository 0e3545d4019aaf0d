//! ReAct over plain text: Thought, `Action: tool[input]`, PAUSE, Observation.
//!
//! The model never sees tool declarations. It names a tool inline; the
//! runner extracts the action with a regex, runs the tool with
//! `{"input": <text>}`, and feeds `Observation: ...` back as a user message.

use agentweave_core::error::GatewayError;
use agentweave_core::gateway::{CompletionRequest, Gateway, ToolCallRequest};
use agentweave_core::message::{Conversation, Message};
use agentweave_core::tool::ToolRegistry;
use regex_lite::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

use crate::tool_agent::AgentStatus;

static ACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Action: (\w+)\[(.*)\]").expect("action pattern compiles"));

const FINAL_ANSWER: &str = "Final Answer:";

/// Extract `(tool, input)` from the first `Action: tool[input]` in a reply.
pub fn parse_action(reply: &str) -> Option<(String, String)> {
    let caps = ACTION.captures(reply)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// One model turn.
#[derive(Debug, Clone)]
pub struct ReactTurn {
    pub reply: String,
    pub action: Option<(String, String)>,
    pub observation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReactResult {
    pub status: AgentStatus,
    /// Text after `Final Answer:`.
    pub answer: Option<String>,
    pub turns: Vec<ReactTurn>,
}

pub struct ReactAgent {
    gateway: Arc<dyn Gateway>,
    tools: Arc<ToolRegistry>,
    persona: String,
    max_turns: u32,
    temperature: f32,
}

impl ReactAgent {
    pub fn new(gateway: Arc<dyn Gateway>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            gateway,
            tools,
            persona: "You are a Research Agent.".into(),
            max_turns: 5,
            temperature: 0.7,
        }
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    pub fn with_max_turns(mut self, max: u32) -> Self {
        self.max_turns = max.max(1);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// The protocol prompt, listing the registered tools.
    pub fn system_prompt(&self) -> String {
        let names = self.tools.names();
        let example = names.first().copied().unwrap_or("tool_name");
        format!(
            "{persona}\n\
             You run in a loop of Thought, Action, PAUSE, Observation.\n\
             At the end of the loop, output your Final Answer.\n\n\
             Use Action: tool_name[input] to use a tool.\n\
             Available tools: {tools}.\n\n\
             Example:\n\
             Thought: I need to look something up.\n\
             Action: {example}[AAPL]\n\
             PAUSE",
            persona = self.persona,
            tools = names.join(", "),
        )
    }

    pub async fn run(&self, query: &str) -> Result<ReactResult, GatewayError> {
        let mut conversation = Conversation::with_system(self.system_prompt(), query);
        let mut turns = Vec::new();

        info!(max_turns = self.max_turns, "ReAct loop starting");

        for turn in 1..=self.max_turns {
            let request = CompletionRequest::new(conversation.messages.clone())
                .with_temperature(self.temperature);
            let reply = self.gateway.complete(request).await?.into_text()?;
            conversation.push(Message::assistant(reply.as_str()));

            if let Some(pos) = reply.find(FINAL_ANSWER) {
                let answer = reply[pos + FINAL_ANSWER.len()..].trim().to_string();
                info!(turn, "ReAct loop completed");
                turns.push(ReactTurn {
                    reply,
                    action: None,
                    observation: None,
                });
                return Ok(ReactResult {
                    status: AgentStatus::Completed,
                    answer: Some(answer),
                    turns,
                });
            }

            let Some((tool, input)) = parse_action(&reply) else {
                debug!(turn, "No action detected, continuing");
                turns.push(ReactTurn {
                    reply,
                    action: None,
                    observation: None,
                });
                continue;
            };

            debug!(turn, %tool, %input, "Executing action");
            let call = ToolCallRequest {
                id: format!("react_{turn}"),
                tool_name: tool.clone(),
                arguments: serde_json::json!({ "input": input }),
            };
            let observation = self.tools.observe(&call).await.output;
            conversation.push(Message::user(format!("Observation: {observation}")));

            turns.push(ReactTurn {
                reply,
                action: Some((tool, input)),
                observation: Some(observation),
            });
        }

        warn!(max_turns = self.max_turns, "ReAct hit its turn limit");
        Ok(ReactResult {
            status: AgentStatus::TurnLimitReached,
            answer: None,
            turns,
        })
    }
}
