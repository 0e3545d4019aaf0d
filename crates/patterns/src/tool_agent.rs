//! Native tool-calling agent.
//!
//! Each turn sends the conversation plus the registry's declarations. A
//! text reply ends the run; tool-call requests are executed and each one is
//! answered by exactly one tool-result message before the conversation is
//! replayed.

use agentweave_core::error::Error;
use agentweave_core::gateway::{Completion, CompletionRequest, Gateway};
use agentweave_core::message::{Content, Conversation, Message};
use agentweave_core::tool::{Observation, ToolRegistry};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How an agent run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStatus {
    Completed,
    TurnLimitReached,
}

#[derive(Debug, Clone)]
pub struct ToolAgentResult {
    pub status: AgentStatus,
    /// The final text reply; `None` if the turn limit was hit first.
    pub answer: Option<String>,
    pub conversation: Conversation,
    /// Every tool observation, in execution order.
    pub observations: Vec<Observation>,
    pub turns: u32,
}

pub struct ToolAgent {
    gateway: Arc<dyn Gateway>,
    tools: Arc<ToolRegistry>,
    system_prompt: String,
    max_turns: u32,
    temperature: f32,
}

impl ToolAgent {
    pub fn new(gateway: Arc<dyn Gateway>, tools: Arc<ToolRegistry>, system_prompt: impl Into<String>) -> Self {
        Self {
            gateway,
            tools,
            system_prompt: system_prompt.into(),
            max_turns: 5,
            temperature: 0.7,
        }
    }

    pub fn with_max_turns(mut self, max: u32) -> Self {
        self.max_turns = max.max(1);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Run on a single user message.
    pub async fn run(&self, query: impl Into<Content>) -> Result<ToolAgentResult, Error> {
        self.run_conversation(Conversation::with_system(self.system_prompt.as_str(), query))
            .await
    }

    /// Continue an existing conversation (e.g. one already passed through an
    /// input guardrail).
    pub async fn run_conversation(&self, mut conversation: Conversation) -> Result<ToolAgentResult, Error> {
        let declarations = self.tools.declarations();
        let mut observations = Vec::new();

        info!(max_turns = self.max_turns, tools = declarations.len(), "Tool agent starting");

        for turn in 1..=self.max_turns {
            conversation.ensure_tool_calls_answered()?;

            let request = CompletionRequest::new(conversation.messages.clone())
                .with_tools(declarations.clone())
                .with_temperature(self.temperature);

            match self.gateway.complete(request).await? {
                Completion::Text { content } => {
                    conversation.push(Message::assistant(content.as_str()));
                    info!(turn, tool_calls = observations.len(), "Tool agent completed");
                    return Ok(ToolAgentResult {
                        status: AgentStatus::Completed,
                        answer: Some(content),
                        conversation,
                        observations,
                        turns: turn,
                    });
                }
                Completion::ToolCalls { calls } => {
                    debug!(turn, calls = calls.len(), "Model requested tools");
                    conversation.push(Message::assistant_tool_calls(calls.clone()));
                    for call in &calls {
                        let observation = self.tools.observe(call).await;
                        conversation.push(Message::tool_result(
                            observation.call_id.as_str(),
                            observation.output.as_str(),
                        ));
                        observations.push(observation);
                    }
                }
            }
        }

        warn!(max_turns = self.max_turns, "Tool agent hit its turn limit");
        Ok(ToolAgentResult {
            status: AgentStatus::TurnLimitReached,
            answer: None,
            conversation,
            observations,
            turns: self.max_turns,
        })
    }
}
