//! Evaluator-optimizer: draft, judge, refine until approved or out of rounds.
//!
//! ```text
//! DRAFTING -> EVALUATING -> APPROVED
//!                        -> REJECTED -> DRAFTING ...
//!                        -> REJECTED -> EXHAUSTED   (ceiling reached)
//! ```

use agentweave_core::error::{DecodeError, GatewayError};
use agentweave_core::gateway::{Gateway, ask};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoopState {
    Drafting,
    Evaluating,
    Approved,
    Rejected,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub feedback: String,
}

/// Decode a judge reply of the form `{"status": "PASS"|"FAIL", "feedback": "..."}`.
///
/// Anything that is not a JSON object is a decode error. Inside an object,
/// any status other than `PASS` (case-insensitive), including a missing one,
/// is a `FAIL`.
pub fn parse_verdict(raw: &str) -> Result<Verdict, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(raw.trim())
        .map_err(|e| DecodeError::new("verdict", format!("not JSON: {e}")))?;
    let obj = value
        .as_object()
        .ok_or_else(|| DecodeError::new("verdict", "expected a JSON object"))?;

    let status = match obj.get("status").and_then(|s| s.as_str()) {
        Some(s) if s.trim().eq_ignore_ascii_case("PASS") => VerdictStatus::Pass,
        _ => VerdictStatus::Fail,
    };
    let feedback = match obj.get("feedback") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    Ok(Verdict { status, feedback })
}

/// One draft and its judgement.
#[derive(Debug, Clone)]
pub struct Iteration {
    pub attempt: u32,
    pub draft: String,
    /// `None` when the judge reply could not be decoded.
    pub verdict: Option<Verdict>,
}

#[derive(Debug, Clone)]
pub struct RefinementResult {
    /// `Approved` or `Exhausted`.
    pub final_state: LoopState,
    pub approved: bool,
    /// Approved only because the judge reply was undecodable.
    pub approved_by_fallback: bool,
    /// The last draft produced.
    pub draft: String,
    pub iterations: Vec<Iteration>,
    /// Every state entered, in order.
    pub transitions: Vec<LoopState>,
}

pub struct EvaluatorOptimizer {
    gateway: Arc<dyn Gateway>,
    generator_prompt: String,
    evaluator_prompt: String,
    max_iterations: u32,
    temperature: f32,
}

impl EvaluatorOptimizer {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        generator_prompt: impl Into<String>,
        evaluator_prompt: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            generator_prompt: generator_prompt.into(),
            evaluator_prompt: evaluator_prompt.into(),
            max_iterations: 3,
            temperature: 0.7,
        }
    }

    /// Set the iteration ceiling (at least one round always runs).
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Temperature for both the drafts and the verdicts.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub async fn run(&self, request: &str) -> Result<RefinementResult, GatewayError> {
        let mut context = request.to_string();
        let mut iterations = Vec::new();
        let mut transitions = Vec::new();
        let mut draft = String::new();

        info!(max_iterations = self.max_iterations, "Refinement loop starting");

        for attempt in 1..=self.max_iterations {
            transitions.push(LoopState::Drafting);
            draft = ask(self.gateway.as_ref(), &self.generator_prompt, &context, self.temperature, false).await?;
            debug!(attempt, draft_len = draft.len(), "Draft produced");

            transitions.push(LoopState::Evaluating);
            let judge_input = format!("Req: {request}\nDraft: {draft}");
            let raw = ask(self.gateway.as_ref(), &self.evaluator_prompt, &judge_input, self.temperature, true).await?;

            let verdict = match parse_verdict(&raw) {
                Ok(v) => v,
                Err(e) => {
                    warn!(attempt, error = %e, "Verdict undecodable, approving by fallback");
                    iterations.push(Iteration {
                        attempt,
                        draft: draft.clone(),
                        verdict: None,
                    });
                    transitions.push(LoopState::Approved);
                    return Ok(RefinementResult {
                        final_state: LoopState::Approved,
                        approved: true,
                        approved_by_fallback: true,
                        draft,
                        iterations,
                        transitions,
                    });
                }
            };

            iterations.push(Iteration {
                attempt,
                draft: draft.clone(),
                verdict: Some(verdict.clone()),
            });

            if verdict.status == VerdictStatus::Pass {
                transitions.push(LoopState::Approved);
                info!(attempt, "Draft approved");
                return Ok(RefinementResult {
                    final_state: LoopState::Approved,
                    approved: true,
                    approved_by_fallback: false,
                    draft,
                    iterations,
                    transitions,
                });
            }

            transitions.push(LoopState::Rejected);
            debug!(attempt, feedback = %verdict.feedback, "Draft rejected");
            context = format!(
                "Original Request: {request}\nPrevious Draft: {draft}\nCritique: {}\nFix it.",
                verdict.feedback
            );
        }

        transitions.push(LoopState::Exhausted);
        warn!(iterations = self.max_iterations, "Refinement ceiling reached without approval");
        Ok(RefinementResult {
            final_state: LoopState::Exhausted,
            approved: false,
            approved_by_fallback: false,
            draft,
            iterations,
            transitions,
        })
    }
}
