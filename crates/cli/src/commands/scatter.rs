//! `agentweave scatter`: parallel branches, then one synthesis call.

use std::sync::Arc;
use std::time::Duration;

use agentweave_core::Gateway;
use agentweave_patterns::{Persona, ScatterGather};

use super::{Context, print_step};

const DEFAULT_TOPIC: &str = "The Future of AI in 2030";
const CONSENSUS_TOPIC: &str = "The origin of the Python programming language name";

/// Three personas writing one sentence each. Returns the runner and the
/// shared user message.
pub fn perspectives(gateway: Arc<dyn Gateway>, topic: &str) -> (ScatterGather, String) {
    let personas = vec![
        Persona::new("Optimist", "You are an Optimist."),
        Persona::new("Pessimist", "You are a Pessimist."),
        Persona::new("Realist", "You are a Realist."),
    ];
    let runner = ScatterGather::new(
        gateway,
        personas,
        "You are a Synthesizer. Combine these views into a balanced conclusion.",
    );
    (runner, format!("Write 1 sentence on {topic}."))
}

/// Three identical agents (no system prompt) and a judge.
pub fn consensus(gateway: Arc<dyn Gateway>, topic: &str) -> (ScatterGather, String) {
    let personas = ["Agent A", "Agent B", "Agent C"]
        .into_iter()
        .map(|label| Persona::new(label, ""))
        .collect();
    let runner = ScatterGather::new(
        gateway,
        personas,
        "You are a Judge. Synthesize the following 3 facts into one definitive truth.",
    );
    (
        runner,
        format!("Provide a brief, 1-sentence interesting fact about: {topic}"),
    )
}

pub async fn run(
    ctx: &Context,
    topic: Option<String>,
    use_consensus: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (runner, prompt) = if use_consensus {
        consensus(ctx.gateway.clone(), topic.as_deref().unwrap_or(CONSENSUS_TOPIC))
    } else {
        perspectives(ctx.gateway.clone(), topic.as_deref().unwrap_or(DEFAULT_TOPIC))
    };
    let timeout = ctx
        .config
        .patterns
        .scatter_branch_timeout_secs
        .map(Duration::from_secs);
    let runner = runner
        .with_branch_timeout(timeout)
        .with_temperature(ctx.config.default_temperature);

    println!("--- PARALLELIZATION (SCATTER-GATHER) ---");
    print_step("Parallel", "Scatter", &prompt);

    let result = runner.run(&prompt).await?;
    print_step("Parallel", "Gathered", &format!("\n{}", result.combined));
    print_step("Parallel", "Gather (Synthesis)", &result.synthesis);
    Ok(())
}
