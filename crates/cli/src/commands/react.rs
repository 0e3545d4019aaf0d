//! `agentweave react`: Thought / Action / Observation over the market tools.

use std::sync::Arc;

use agentweave_patterns::{AgentStatus, ReactAgent};

use super::{Context, print_step};

const DEFAULT_QUERY: &str = "Is Nvidia a good buy right now? Check price and news.";

pub async fn run(ctx: &Context, query: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let query = query.unwrap_or_else(|| DEFAULT_QUERY.to_string());
    let tools = Arc::new(agentweave_tools::market_registry()?);
    let agent = ReactAgent::new(ctx.gateway.clone(), tools)
        .with_persona("You are a Financial Research Agent.")
        .with_max_turns(ctx.config.patterns.agent_max_turns)
        .with_temperature(ctx.config.default_temperature);

    println!("User: {query}");
    let result = agent.run(&query).await?;

    for (i, turn) in result.turns.iter().enumerate() {
        print_step("ReAct", &format!("Turn {}", i + 1), &turn.reply);
        if let Some(observation) = &turn.observation {
            print_step("ReAct", "Observation", observation);
        }
    }
    match (result.status, result.answer) {
        (AgentStatus::Completed, Some(answer)) => print_step("ReAct", "Final Answer", &answer),
        _ => print_step("ReAct", "Stopped", "turn limit reached without a final answer"),
    }
    Ok(())
}
