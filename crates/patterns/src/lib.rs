//! Pattern runners for composing LLM calls.
//!
//! Each runner owns an `Arc<dyn Gateway>` and any process-scoped state it
//! needs (tool registry, cache, tracer), all injected by the caller:
//!
//! - **Chain**: stage output feeds the next stage's input
//! - **Router**: classify at temperature 0, dispatch on the label
//! - **ScatterGather**: concurrent personas, then a synthesis call
//! - **Orchestrator**: plan K sub-tasks, run workers, join
//! - **EvaluatorOptimizer**: draft / judge / revise until PASS or the ceiling
//! - **ToolAgent** / **ReactAgent**: tool loops (native calls or text protocol)
//! - **SecureExecutor**: cache + span + PII filter around one call

pub mod chain;
pub mod evaluator;
pub mod orchestrator;
pub mod react;
pub mod routing;
pub mod scatter;
pub mod secure;
pub mod tool_agent;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use chain::{Chain, ChainResult, Stage, StepOutput};
pub use evaluator::{
    EvaluatorOptimizer, Iteration, LoopState, RefinementResult, Verdict, VerdictStatus,
    parse_verdict,
};
pub use orchestrator::{Orchestrator, OrchestratorResult, PlanSource, WorkerMode, parse_plan};
pub use react::{ReactAgent, ReactResult, ReactTurn, parse_action};
pub use routing::{
    PromptHandler, RouteDecision, RouteHandler, RouteOutcome, Router, StaticHandler,
};
pub use scatter::{BranchOutput, Persona, ScatterGather, ScatterResult};
pub use secure::{ResponseSource, SecureError, SecureExecutor, SecureOutcome};
pub use tool_agent::{AgentStatus, ToolAgent, ToolAgentResult};
