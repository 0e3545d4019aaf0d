//! `agentweave orchestrate`: editor plans, writers draft, sections joined.

use std::sync::Arc;

use agentweave_config::AppConfig;
use agentweave_core::Gateway;
use agentweave_patterns::{Orchestrator, PlanSource, WorkerMode};

use super::{Context, print_step};

const DEFAULT_TASK: &str =
    "Write a blog post about coffee. Section 1: History. Section 2: Health Benefits.";

pub fn blog_orchestrator(gateway: Arc<dyn Gateway>, config: &AppConfig, concurrent: bool) -> Orchestrator {
    let patterns = &config.patterns;
    let mode = if concurrent || patterns.orchestrator_concurrent {
        WorkerMode::Concurrent
    } else {
        WorkerMode::Sequential
    };
    Orchestrator::new(
        gateway,
        patterns.orchestrator_subtasks,
        vec![
            "Write history of coffee".into(),
            "Write health benefits of coffee".into(),
        ],
    )
    .with_worker_prompt("You are a Blog Writer. Write 1 short paragraph.")
    .with_mode(mode)
    .with_temperature(config.default_temperature)
}

pub async fn run(
    ctx: &Context,
    task: Option<String>,
    concurrent: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let task = task.unwrap_or_else(|| DEFAULT_TASK.to_string());
    let orchestrator = blog_orchestrator(ctx.gateway.clone(), &ctx.config, concurrent);

    println!("--- ORCHESTRATOR-WORKERS ---");
    let result = orchestrator.run(&task).await?;

    let plan = match &result.plan_source {
        PlanSource::Planner => format!("{:?}", result.tasks),
        PlanSource::Fallback { reason } => format!("{:?} (fallback: {reason})", result.tasks),
    };
    print_step("Orchestrator", "Plan", &plan);
    for (i, output) in result.worker_outputs.iter().enumerate() {
        print_step("Orchestrator", &format!("Worker {}", i + 1), output);
    }
    print_step("Orchestrator", "Final Output", &result.output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offline_plan_degrades_to_fallback() {
        let ctx = Context::offline();
        let result = blog_orchestrator(ctx.gateway, &ctx.config, false)
            .run(DEFAULT_TASK)
            .await
            .unwrap();
        assert!(matches!(result.plan_source, PlanSource::Fallback { .. }));
        assert_eq!(result.tasks[0], "Write history of coffee");
        assert_eq!(result.worker_outputs.len(), 2);
    }
}
