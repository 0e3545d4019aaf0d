//! Scatter-gather: the same input to several personas at once, then a
//! synthesis call over their labelled answers.
//!
//! All-or-nothing. Branches are joined with `try_join_all`, so the first
//! branch error (or timeout) drops every branch still in flight and is
//! returned unchanged. Results are combined in launch order, whatever
//! order the branches finished in.

use agentweave_core::error::GatewayError;
use agentweave_core::gateway::{CompletionRequest, Gateway, ask};
use agentweave_core::message::Message;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One branch of the fan-out.
#[derive(Debug, Clone)]
pub struct Persona {
    pub label: String,
    /// Sent as the system message; an empty prompt sends the user message alone.
    pub system_prompt: String,
}

impl Persona {
    pub fn new(label: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            system_prompt: system_prompt.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BranchOutput {
    pub label: String,
    pub output: String,
}

#[derive(Debug, Clone)]
pub struct ScatterResult {
    /// Branch outputs in launch order.
    pub branches: Vec<BranchOutput>,
    /// The `"{label}: {output}"` lines handed to the synthesis call.
    pub combined: String,
    pub synthesis: String,
}

pub struct ScatterGather {
    gateway: Arc<dyn Gateway>,
    personas: Vec<Persona>,
    synthesis_prompt: String,
    branch_timeout: Option<Duration>,
    temperature: f32,
}

impl ScatterGather {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        personas: Vec<Persona>,
        synthesis_prompt: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            personas,
            synthesis_prompt: synthesis_prompt.into(),
            branch_timeout: None,
            temperature: 0.7,
        }
    }

    /// Fail a branch (and so the whole run) if it takes longer than this.
    pub fn with_branch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.branch_timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    async fn branch(&self, persona: &Persona, user: &str) -> Result<BranchOutput, GatewayError> {
        let mut messages = Vec::with_capacity(2);
        if !persona.system_prompt.is_empty() {
            messages.push(Message::system(persona.system_prompt.as_str()));
        }
        messages.push(Message::user(user));
        let request = CompletionRequest::new(messages).with_temperature(self.temperature);

        let call = self.gateway.complete(request);
        let completion = match self.branch_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                warn!(branch = %persona.label, ?limit, "Branch timed out");
                GatewayError::Timeout(format!(
                    "branch '{}' exceeded {}ms",
                    persona.label,
                    limit.as_millis()
                ))
            })??,
            None => call.await?,
        };

        let output = completion.into_text()?;
        debug!(branch = %persona.label, output_len = output.len(), "Branch finished");
        Ok(BranchOutput {
            label: persona.label.clone(),
            output,
        })
    }

    pub async fn run(&self, user: &str) -> Result<ScatterResult, GatewayError> {
        info!(branches = self.personas.len(), "Scatter starting");

        let branches =
            try_join_all(self.personas.iter().map(|persona| self.branch(persona, user))).await?;

        let combined = branches
            .iter()
            .map(|b| format!("{}: {}", b.label, b.output))
            .collect::<Vec<_>>()
            .join("\n");

        let synthesis = ask(
            self.gateway.as_ref(),
            &self.synthesis_prompt,
            &combined,
            self.temperature,
            false,
        )
        .await?;

        info!(branches = branches.len(), "Gather completed");
        Ok(ScatterResult {
            branches,
            combined,
            synthesis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::PersonaGateway;

    const SYNTH: &str = "You are a Synthesizer.";

    fn personas() -> Vec<Persona> {
        vec![
            Persona::new("Optimist", "You are an Optimist."),
            Persona::new("Pessimist", "You are a Pessimist."),
            Persona::new("Realist", "You are a Realist."),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn results_follow_launch_order_not_completion_order() {
        let gateway = Arc::new(
            PersonaGateway::new("balanced view")
                .reply("You are an Optimist.", 300, "A")
                .reply("You are a Pessimist.", 200, "B")
                .reply("You are a Realist.", 100, "C"),
        );
        let scatter = ScatterGather::new(gateway.clone(), personas(), SYNTH);

        let result = scatter.run("Write 1 sentence on AI in 2030.").await.unwrap();

        assert_eq!(
            gateway.completed(),
            vec!["You are a Realist.", "You are a Pessimist.", "You are an Optimist."]
        );
        assert_eq!(result.combined, "Optimist: A\nPessimist: B\nRealist: C");
        assert_eq!(result.synthesis, "balanced view");

        let synth_request = gateway.requests().pop().unwrap();
        assert_eq!(synth_request.system_prompt().as_deref(), Some(SYNTH));
        assert_eq!(synth_request.last_user_text().as_deref(), Some(result.combined.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn branches_run_concurrently() {
        let gateway = Arc::new(
            PersonaGateway::new("ok")
                .reply("You are an Optimist.", 1000, "A")
                .reply("You are a Pessimist.", 1000, "B")
                .reply("You are a Realist.", 1000, "C"),
        );
        let start = tokio::time::Instant::now();
        ScatterGather::new(gateway, personas(), SYNTH)
            .run("topic")
            .await
            .unwrap();
        assert!(start.elapsed() < Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn first_error_cancels_remaining_branches() {
        let gateway = Arc::new(
            PersonaGateway::new("unused")
                .reply("You are an Optimist.", 5_000, "A")
                .fail("You are a Pessimist.", 10, GatewayError::Network("boom".into()))
                .reply("You are a Realist.", 5_000, "C"),
        );
        let start = tokio::time::Instant::now();
        let err = ScatterGather::new(gateway.clone(), personas(), SYNTH)
            .run("topic")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Network(_)));
        assert!(start.elapsed() < Duration::from_secs(1));
        // Slow branches were dropped, and no synthesis call was made.
        assert_eq!(gateway.completed(), vec!["You are a Pessimist."]);
        assert_eq!(gateway.requests().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_branch_times_out() {
        let gateway = Arc::new(
            PersonaGateway::new("unused")
                .reply("You are an Optimist.", 10, "A")
                .reply("You are a Pessimist.", 120_000, "B")
                .reply("You are a Realist.", 10, "C"),
        );
        let err = ScatterGather::new(gateway, personas(), SYNTH)
            .with_branch_timeout(Some(Duration::from_secs(60)))
            .run("topic")
            .await
            .unwrap_err();
        match err {
            GatewayError::Timeout(msg) => assert!(msg.contains("Pessimist")),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn persona_without_system_prompt_sends_user_only() {
        let gateway = Arc::new(PersonaGateway::new("fact"));
        let personas = vec![Persona::new("Agent A", ""), Persona::new("Agent B", "")];
        let result = ScatterGather::new(gateway.clone(), personas, "You are a Judge.")
            .run("Provide a brief fact")
            .await
            .unwrap();
        assert_eq!(result.combined, "Agent A: fact\nAgent B: fact");
        assert_eq!(gateway.requests()[0].messages.len(), 1);
    }
}
