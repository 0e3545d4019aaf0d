//! `agentweave route`: classify support queries, dispatch to a specialist.

use std::sync::Arc;

use agentweave_core::Gateway;
use agentweave_patterns::{PromptHandler, RouteDecision, Router, StaticHandler};

use super::{Context, print_step};

const DEMO_QUERIES: [&str; 3] = [
    "My bill is wrong, I was charged twice.",
    "How do I reset my password?",
    "Tell me a joke.",
];

const SUPPORT_ROUTER_PROMPT: &str = "You are a Customer Support Router.
Classify the user query into one of these categories:
- BILLING (Payments, refunds, invoices)
- TECHNICAL (Bugs, login issues, configuration)
- GENERAL (Everything else)

Output ONLY the category name. Do not explain.";

/// Persona handlers: each route is another gateway call.
pub fn support_router(gateway: Arc<dyn Gateway>, temperature: f32) -> Router {
    let persona = |prompt: &str| PromptHandler::new(gateway.clone(), prompt).with_temperature(temperature);
    Router::new(gateway.clone(), persona("You are a Chatbot. Be witty."))
        .with_route("BILLING", persona("You are a Billing Agent. Be empathetic."))
        .with_route("TECHNICAL", persona("You are a Tech Support. Be precise."))
        .with_route("GENERAL", persona("You are a Chatbot. Be witty."))
}

/// Fixed-reply handlers behind the descriptive router prompt.
pub fn canned_router(gateway: Arc<dyn Gateway>) -> Router {
    Router::new(
        gateway,
        StaticHandler::new("General Agent: I can help you with that. What specifically do you need?"),
    )
    .with_classifier_prompt(SUPPORT_ROUTER_PROMPT)
    .with_route(
        "BILLING",
        StaticHandler::new("Billing Agent: I see your last payment of $49.99 was processed on Jan 1st."),
    )
    .with_route(
        "TECHNICAL",
        StaticHandler::new("Tech Agent: To reset your password, please go to Settings > Security."),
    )
}

pub async fn run(
    ctx: &Context,
    queries: Vec<String>,
    canned: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let queries = if queries.is_empty() {
        DEMO_QUERIES.iter().map(|q| q.to_string()).collect()
    } else {
        queries
    };
    let router = if canned {
        canned_router(ctx.gateway.clone())
    } else {
        support_router(ctx.gateway.clone(), ctx.config.default_temperature)
    };

    println!("--- ROUTING ---");
    for query in &queries {
        let outcome = router.route(query).await?;
        let label = match &outcome.decision {
            RouteDecision::Matched(label) => label.as_str(),
            RouteDecision::Default => "DEFAULT",
        };
        print_step("Router", &format!("Route: {label}"), &outcome.response);
    }
    Ok(())
}
