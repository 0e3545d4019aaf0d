//! Prompt chaining: each stage's full output is the next stage's input.

use agentweave_core::error::GatewayError;
use agentweave_core::gateway::{Gateway, ask};
use std::sync::Arc;
use tracing::{debug, info};

/// One step of a chain.
#[derive(Debug, Clone)]
pub struct Stage {
    pub name: String,
    pub system_prompt: String,
    pub json_mode: bool,
    pub temperature: f32,
}

impl Stage {
    pub fn new(name: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
            json_mode: false,
            temperature: 0.7,
        }
    }

    pub fn with_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Output of one executed stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    pub stage: String,
    pub output: String,
}

/// The result of running a chain.
#[derive(Debug, Clone)]
pub struct ChainResult {
    /// Every stage's output, in order.
    pub steps: Vec<StepOutput>,
    /// The terminal stage's output (the input itself for an empty chain).
    pub output: String,
}

/// A linear pipeline of stages. No branching and no retry: the first
/// gateway failure ends the run.
pub struct Chain {
    gateway: Arc<dyn Gateway>,
    stages: Vec<Stage>,
}

impl Chain {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            stages: Vec::new(),
        }
    }

    /// Append a stage.
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub async fn run(&self, input: &str) -> Result<ChainResult, GatewayError> {
        info!(stages = self.stages.len(), "Chain starting");

        let mut current = input.to_string();
        let mut steps = Vec::with_capacity(self.stages.len());

        for (i, stage) in self.stages.iter().enumerate() {
            let output = ask(
                self.gateway.as_ref(),
                &stage.system_prompt,
                &current,
                stage.temperature,
                stage.json_mode,
            )
            .await?;

            debug!(step = i + 1, stage = %stage.name, output_len = output.len(), "Chain stage done");
            steps.push(StepOutput {
                stage: stage.name.clone(),
                output: output.clone(),
            });
            current = output;
        }

        info!(steps = steps.len(), "Chain completed");
        Ok(ChainResult {
            steps,
            output: current,
        })
    }
}
