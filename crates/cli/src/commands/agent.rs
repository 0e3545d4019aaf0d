//! `agentweave agent`: native tool calling over the demo tools.
//!
//! The market scenario is a plain tool-calling run. The returns and claims
//! scenarios are review flows: the user turn goes through the input rail,
//! an assessment call describes the evidence, and a user-only orchestrator
//! turn approves the case by calling the scenario's tool. Whether that tool
//! ran decides the final action.

use std::sync::Arc;

use agentweave_core::gateway::CompletionRequest;
use agentweave_core::tool::ToolRegistry;
use agentweave_core::{Content, ContentPart, Conversation, Message};
use agentweave_guardrails::redact_messages;
use agentweave_patterns::{AgentStatus, ToolAgent, ToolAgentResult};
use agentweave_tools::SimulatedFs;
use clap::ValueEnum;
use tracing::info;

use super::{Context, print_step};

const MARKET_QUERY: &str = "Is Nvidia a good buy right now? Check price and news.";
const MARKET_SYSTEM: &str = "You are a helpful financial assistant. Use tools to answer questions.";

const RETURNS_QUERY: &str = "Return order 999. My email is max@store.com. The item arrived broken.";
const CLAIMS_QUERY: &str = "Claim for max@email.com. Analysis needed for fender bender.";

/// Coverage reported by the policy lookup.
pub const POLICY_STATUS: &str = "Comprehensive Policy Active. $500 Deductible applies.";
/// Score reported by the fraud check.
pub const FRAUD_SCORE: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Price and news lookup
    Market,
    /// Retail return with a refund manifest
    Returns,
    /// Insurance claim with an adjudication report
    Claims,
}

impl Scenario {
    fn default_query(self) -> &'static str {
        match self {
            Scenario::Market => MARKET_QUERY,
            Scenario::Returns => RETURNS_QUERY,
            Scenario::Claims => CLAIMS_QUERY,
        }
    }

    /// The tool whose successful call approves a review flow.
    pub fn approval_tool(self) -> Option<&'static str> {
        match self {
            Scenario::Market => None,
            Scenario::Returns => Some("write_return_manifest"),
            Scenario::Claims => Some("save_adjudication_report"),
        }
    }

    /// Final action label for a review flow.
    pub fn final_action(self, approved: bool) -> &'static str {
        match (self, approved) {
            (Scenario::Claims, true) => "Approve",
            (Scenario::Claims, false) => "Human Review",
            (_, true) => "Instant Refund",
            (_, false) => "Human Review Required",
        }
    }

    /// The orchestrator's instruction, built from the assessment.
    pub fn orchestrator_prompt(self, assessment: &str) -> String {
        match self {
            Scenario::Claims => format!(
                "Review claim: Damage: {assessment}, Policy: {POLICY_STATUS}, Fraud: {FRAUD_SCORE}.\n\
                 If risk < 0.2, call 'save_adjudication_report'. Otherwise, flag 'Human Review'."
            ),
            _ => format!(
                "Review return request.\n\
                 Evidence: {assessment}\n\
                 Instruction: If item is damaged/defective, call 'write_return_manifest' to Approve.\n\
                 Otherwise, flag for Human Review."
            ),
        }
    }
}

/// The review flow's user turn (text plus an optional image), passed
/// through the input rail.
pub fn review_input(query: &str, image: Option<&str>) -> Vec<Message> {
    let mut parts = vec![ContentPart::Text { text: query.to_string() }];
    if let Some(url) = image {
        parts.push(ContentPart::ImageUrl { url: url.to_string() });
    }
    redact_messages(&[Message::user(Content::Parts(parts))])
}

/// Everything a review flow produced.
#[derive(Debug)]
pub struct Review {
    /// The redacted user turn.
    pub input: Vec<Message>,
    pub assessment: String,
    pub result: ToolAgentResult,
    pub final_action: &'static str,
}

/// True when `tool` ran without error during the run.
pub fn tool_was_called(result: &ToolAgentResult, tool: &str) -> bool {
    result
        .observations
        .iter()
        .any(|o| o.tool_name == tool && !o.is_error)
}

/// Run the returns or claims flow end to end.
pub async fn review(
    ctx: &Context,
    tools: Arc<ToolRegistry>,
    scenario: Scenario,
    query: &str,
    image: Option<&str>,
) -> Result<Review, Box<dyn std::error::Error>> {
    let temperature = ctx.config.default_temperature;
    let input = review_input(query, image);

    let assessment = ctx
        .gateway
        .complete(CompletionRequest::new(input.clone()).with_temperature(temperature))
        .await?
        .into_text()?;

    let mut conversation = Conversation::new();
    conversation.push(Message::user(scenario.orchestrator_prompt(&assessment)));
    let result = ToolAgent::new(ctx.gateway.clone(), tools, String::new())
        .with_max_turns(ctx.config.patterns.agent_max_turns)
        .with_temperature(temperature)
        .run_conversation(conversation)
        .await?;

    let approved = scenario
        .approval_tool()
        .is_some_and(|tool| tool_was_called(&result, tool));
    let final_action = scenario.final_action(approved);
    info!(?scenario, approved, final_action, "Review flow finished");

    Ok(Review {
        input,
        assessment,
        result,
        final_action,
    })
}

pub async fn run(
    ctx: &Context,
    query: Option<String>,
    scenario: Scenario,
    image: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let fs = SimulatedFs::new();
    let tools = Arc::new(agentweave_tools::demo_registry(fs.clone())?);
    let query = query.unwrap_or_else(|| scenario.default_query().to_string());

    if scenario == Scenario::Market {
        println!("User: {query}");
        let result = ToolAgent::new(ctx.gateway.clone(), tools, MARKET_SYSTEM)
            .with_max_turns(ctx.config.patterns.agent_max_turns)
            .with_temperature(ctx.config.default_temperature)
            .run(query)
            .await?;
        report(&result);
    } else {
        let review = review(ctx, tools, scenario, &query, image.as_deref()).await?;
        if let Some(user) = review.input.last() {
            print_step("Agent", "Input rail", &user.text());
        }
        print_step("Agent", "Assessment", &review.assessment);
        report(&review.result);
        print_step("Agent", "Final Action", review.final_action);
    }

    for file in fs.list() {
        if let Some(content) = fs.read(&file) {
            print_step("Agent", &format!("File {file}"), &content);
        }
    }
    Ok(())
}

fn report(result: &ToolAgentResult) {
    for observation in &result.observations {
        print_step(
            "Agent",
            &format!("Tool {} ({})", observation.tool_name, observation.call_id),
            &observation.output,
        );
    }
    match (&result.status, &result.answer) {
        (AgentStatus::Completed, Some(answer)) => print_step("Agent", "Final Answer", answer),
        _ => print_step("Agent", "Stopped", "turn limit reached without a final answer"),
    }
}
