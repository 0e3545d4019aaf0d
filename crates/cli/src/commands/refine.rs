//! `agentweave refine`: junior coder drafts, senior dev judges.

use std::sync::Arc;

use agentweave_core::Gateway;
use agentweave_patterns::{EvaluatorOptimizer, VerdictStatus};

use super::{Context, print_step};

const DEFAULT_REQUEST: &str =
    "Write a python function to add two numbers, but make the variable names terrible.";

const JUDGE_PROMPT: &str = "You are a Senior Dev. Evaluate code. If variable names are bad/unreadable, say PASS. \
If they are clean/good, say FAIL (because prompt asked for terrible names). \
Return JSON {'status': 'PASS'/'FAIL', 'feedback': 'string'}";

pub fn code_review_loop(gateway: Arc<dyn Gateway>, max_iterations: u32, temperature: f32) -> EvaluatorOptimizer {
    EvaluatorOptimizer::new(
        gateway,
        "You are a Junior Coder. Write the code requested.",
        JUDGE_PROMPT,
    )
    .with_max_iterations(max_iterations)
    .with_temperature(temperature)
}

pub async fn run(
    ctx: &Context,
    request: Option<String>,
    max_iterations: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = request.unwrap_or_else(|| DEFAULT_REQUEST.to_string());
    let max = max_iterations.unwrap_or(ctx.config.patterns.evaluator_max_iterations);

    println!("--- EVALUATOR-OPTIMIZER ---");
    let result = code_review_loop(ctx.gateway.clone(), max, ctx.config.default_temperature).run(&request).await?;

    for iteration in &result.iterations {
        print_step("Loop", &format!("Draft {}", iteration.attempt), &iteration.draft);
        match &iteration.verdict {
            Some(verdict) => {
                let status = match verdict.status {
                    VerdictStatus::Pass => "APPROVED",
                    VerdictStatus::Fail => "REJECTED",
                };
                print_step("Loop", &format!("Evaluation ({status})"), &verdict.feedback);
            }
            None => print_step("Loop", "Evaluation (APPROVED)", "JSON Error"),
        }
    }
    print_step("Loop", &format!("Final state {:?}", result.final_state), &result.draft);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentweave_patterns::LoopState;

    #[tokio::test]
    async fn offline_verdict_is_fallback_approval() {
        let result = code_review_loop(Context::offline().gateway, 3, 0.7)
            .run(DEFAULT_REQUEST)
            .await
            .unwrap();
        assert_eq!(result.final_state, LoopState::Approved);
        assert!(result.approved_by_fallback);
        assert_eq!(result.iterations.len(), 1);
    }
}
