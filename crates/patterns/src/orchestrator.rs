//! Orchestrator-workers: plan sub-tasks, run a worker per sub-task,
//! concatenate the results.

use agentweave_core::error::{DecodeError, GatewayError};
use agentweave_core::gateway::{Gateway, ask};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How phase-2 workers are scheduled. Output order is sub-task order
/// either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerMode {
    #[default]
    Sequential,
    Concurrent,
}

/// Where the executed plan came from.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanSource {
    Planner,
    /// The planner reply could not be decoded; the configured fallback ran.
    Fallback { reason: String },
}

#[derive(Debug, Clone)]
pub struct OrchestratorResult {
    pub tasks: Vec<String>,
    pub plan_source: PlanSource,
    /// One output per task, in task order.
    pub worker_outputs: Vec<String>,
    /// Worker outputs joined by a blank line.
    pub output: String,
}

/// Decode a planner reply into exactly `expected` sub-task prompts.
///
/// Accepted shapes: `{"tasks": [..]}`, an object whose first value is an
/// array, or a bare array. Every element must be a string.
pub fn parse_plan(raw: &str, expected: usize) -> Result<Vec<String>, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(raw.trim())
        .map_err(|e| DecodeError::new("plan", format!("not JSON: {e}")))?;

    let list = match &value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(map) => match map.get("tasks") {
            Some(serde_json::Value::Array(items)) => items,
            Some(_) => return Err(DecodeError::new("plan", "'tasks' is not a list")),
            None => match map.values().next() {
                Some(serde_json::Value::Array(items)) => items,
                _ => return Err(DecodeError::new("plan", "object has no task list")),
            },
        },
        _ => return Err(DecodeError::new("plan", "expected a list or an object")),
    };

    let tasks = list
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| DecodeError::new("plan", "task entries must be strings"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if tasks.len() != expected {
        return Err(DecodeError::new(
            "plan",
            format!("expected {expected} tasks, got {}", tasks.len()),
        ));
    }
    Ok(tasks)
}

pub struct Orchestrator {
    gateway: Arc<dyn Gateway>,
    subtasks: usize,
    planner_prompt: Option<String>,
    worker_prompt: String,
    fallback: Vec<String>,
    mode: WorkerMode,
    temperature: f32,
}

impl Orchestrator {
    /// `fallback` is the decomposition used when the plan cannot be decoded.
    pub fn new(gateway: Arc<dyn Gateway>, subtasks: usize, fallback: Vec<String>) -> Self {
        Self {
            gateway,
            subtasks,
            planner_prompt: None,
            worker_prompt: "You are a Writer. Write 1 short paragraph.".into(),
            fallback,
            mode: WorkerMode::Sequential,
            temperature: 0.7,
        }
    }

    pub fn with_planner_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.planner_prompt = Some(prompt.into());
        self
    }

    pub fn with_worker_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.worker_prompt = prompt.into();
        self
    }

    pub fn with_mode(mut self, mode: WorkerMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn planner_prompt(&self) -> String {
        self.planner_prompt.clone().unwrap_or_else(|| {
            format!(
                "You are an Editor. Break the task into exactly {} sub-task prompts for writers. \
                 Return JSON {{\"tasks\": [\"task1\", \"task2\", ...]}}.",
                self.subtasks
            )
        })
    }

    async fn plan(&self, task: &str) -> Result<(Vec<String>, PlanSource), GatewayError> {
        let raw = ask(self.gateway.as_ref(), &self.planner_prompt(), task, self.temperature, true).await?;
        match parse_plan(&raw, self.subtasks) {
            Ok(tasks) => Ok((tasks, PlanSource::Planner)),
            Err(e) => {
                warn!(error = %e, "Plan decode failed, using fallback decomposition");
                Ok((
                    self.fallback.clone(),
                    PlanSource::Fallback {
                        reason: e.to_string(),
                    },
                ))
            }
        }
    }

    async fn work(&self, subtask: &str) -> Result<String, GatewayError> {
        ask(self.gateway.as_ref(), &self.worker_prompt, subtask, self.temperature, false).await
    }

    pub async fn run(&self, task: &str) -> Result<OrchestratorResult, GatewayError> {
        let (tasks, plan_source) = self.plan(task).await?;
        info!(tasks = tasks.len(), mode = ?self.mode, ?plan_source, "Plan ready");

        let worker_outputs = match self.mode {
            WorkerMode::Sequential => {
                let mut outputs = Vec::with_capacity(tasks.len());
                for (i, subtask) in tasks.iter().enumerate() {
                    let output = self.work(subtask).await?;
                    debug!(worker = i + 1, output_len = output.len(), "Worker finished");
                    outputs.push(output);
                }
                outputs
            }
            WorkerMode::Concurrent => try_join_all(tasks.iter().map(|t| self.work(t))).await?,
        };

        let output = worker_outputs.join("\n\n");
        info!(workers = worker_outputs.len(), "Orchestrator completed");
        Ok(OrchestratorResult {
            tasks,
            plan_source,
            worker_outputs,
            output,
        })
    }
}
