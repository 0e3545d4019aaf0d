//! `agentweave chain`: idea, ingredients, shopping list.

use std::sync::Arc;

use agentweave_core::Gateway;
use agentweave_patterns::{Chain, Stage};

use super::{Context, print_step};

const DEFAULT_INPUT: &str = "I want to cook a romantic dinner for 2, vegetarian, under 30 mins.";

pub fn recipe_chain(gateway: Arc<dyn Gateway>, temperature: f32) -> Chain {
    Chain::new(gateway)
        .with_stage(
            Stage::new(
                "Idea",
                "You are a Chef. Suggest ONE meal name based on constraints.",
            )
            .with_temperature(temperature),
        )
        .with_stage(
            Stage::new(
                "Ingredients",
                "You are a Sous Chef. List ingredients for the provided meal name as a CSV list.",
            )
            .with_temperature(temperature),
        )
        .with_stage(
            Stage::new(
                "JSON",
                "You are a Clerk. Convert CSV ingredients to a JSON object with 'aisle' and 'item'.",
            )
            .with_json_mode()
            .with_temperature(temperature),
        )
}

pub async fn run(ctx: &Context, input: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let input = input.unwrap_or_else(|| DEFAULT_INPUT.to_string());
    println!("--- PROMPT CHAINING ---");

    let result = recipe_chain(ctx.gateway.clone(), ctx.config.default_temperature).run(&input).await?;
    for (i, step) in result.steps.iter().enumerate() {
        print_step("Chain", &format!("Step {} ({})", i + 1, step.stage), &step.output);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_last_stage_is_json() {
        let ctx = Context::offline();
        let chain = recipe_chain(ctx.gateway, 0.5);
        let flags: Vec<bool> = chain.stages().iter().map(|s| s.json_mode).collect();
        assert_eq!(flags, vec![false, false, true]);
        assert!(chain.stages().iter().all(|s| s.temperature == 0.5));
    }

    #[tokio::test]
    async fn offline_run_produces_three_steps() {
        let ctx = Context::offline();
        let result = recipe_chain(ctx.gateway, ctx.config.default_temperature).run(DEFAULT_INPUT).await.unwrap();
        assert_eq!(result.steps.len(), 3);
        assert_eq!(result.output, agentweave_providers::SIMULATED_OUTPUT);
    }
}
