//! Intent routing: classify, then dispatch to the handler bound to the label.

use agentweave_core::error::GatewayError;
use agentweave_core::gateway::{Gateway, ask};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Something that can answer a routed query.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn handle(&self, query: &str) -> Result<String, GatewayError>;
}

/// Answers with a persona-specific gateway call.
pub struct PromptHandler {
    gateway: Arc<dyn Gateway>,
    system_prompt: String,
    temperature: f32,
}

impl PromptHandler {
    pub fn new(gateway: Arc<dyn Gateway>, system_prompt: impl Into<String>) -> Self {
        Self {
            gateway,
            system_prompt: system_prompt.into(),
            temperature: 0.7,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl RouteHandler for PromptHandler {
    async fn handle(&self, query: &str) -> Result<String, GatewayError> {
        ask(
            self.gateway.as_ref(),
            &self.system_prompt,
            query,
            self.temperature,
            false,
        )
        .await
    }
}

/// Answers with a fixed reply, standing in for a backend system.
pub struct StaticHandler {
    reply: String,
}

impl StaticHandler {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl RouteHandler for StaticHandler {
    async fn handle(&self, _query: &str) -> Result<String, GatewayError> {
        Ok(self.reply.clone())
    }
}

/// Which handler a query went to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Matched(String),
    Default,
}

#[derive(Debug, Clone)]
pub struct RouteOutcome {
    pub decision: RouteDecision,
    /// The classifier's raw reply.
    pub classifier_output: String,
    pub response: String,
}

struct Route {
    label: String,
    handler: Box<dyn RouteHandler>,
}

/// A classifier plus a closed, ordered set of labelled handlers.
///
/// Registration order is priority order: when the classifier output
/// mentions several labels, the earliest registered one wins.
pub struct Router {
    gateway: Arc<dyn Gateway>,
    classifier_prompt: Option<String>,
    routes: Vec<Route>,
    default: Box<dyn RouteHandler>,
}

impl Router {
    pub fn new(gateway: Arc<dyn Gateway>, default: impl RouteHandler + 'static) -> Self {
        Self {
            gateway,
            classifier_prompt: None,
            routes: Vec::new(),
            default: Box::new(default),
        }
    }

    pub fn with_route(mut self, label: impl Into<String>, handler: impl RouteHandler + 'static) -> Self {
        self.routes.push(Route {
            label: label.into().to_uppercase(),
            handler: Box::new(handler),
        });
        self
    }

    /// Replace the generated classifier prompt.
    pub fn with_classifier_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.classifier_prompt = Some(prompt.into());
        self
    }

    pub fn labels(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.label.as_str()).collect()
    }

    /// The system prompt sent to the classifier.
    pub fn classifier_prompt(&self) -> String {
        if let Some(prompt) = &self.classifier_prompt {
            return prompt.clone();
        }
        let mut prompt = String::from("Classify the user query into exactly one category:\n");
        for label in self.labels() {
            prompt.push_str("- ");
            prompt.push_str(label);
            prompt.push('\n');
        }
        prompt.push_str("Output only the category name.");
        prompt
    }

    /// Map classifier output to a decision. Substring match, case-insensitive.
    pub fn decide(&self, classifier_output: &str) -> RouteDecision {
        let normalized = classifier_output.trim().to_uppercase();
        self.routes
            .iter()
            .find(|r| normalized.contains(&r.label))
            .map(|r| RouteDecision::Matched(r.label.clone()))
            .unwrap_or(RouteDecision::Default)
    }

    pub async fn route(&self, query: &str) -> Result<RouteOutcome, GatewayError> {
        let classifier_output = ask(
            self.gateway.as_ref(),
            &self.classifier_prompt(),
            query,
            0.0,
            false,
        )
        .await?;

        let decision = self.decide(&classifier_output);
        debug!(raw = %classifier_output.trim(), ?decision, "Classifier replied");

        let handler = match &decision {
            RouteDecision::Matched(label) => self
                .routes
                .iter()
                .find(|r| &r.label == label)
                .map(|r| r.handler.as_ref())
                .unwrap_or(self.default.as_ref()),
            RouteDecision::Default => self.default.as_ref(),
        };

        let response = handler.handle(query).await?;
        info!(?decision, "Query routed");

        Ok(RouteOutcome {
            decision,
            classifier_output,
            response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedGateway;

    fn support_router(gateway: Arc<dyn Gateway>) -> Router {
        Router::new(gateway, StaticHandler::new("general reply"))
            .with_route("BILLING", StaticHandler::new("billing reply"))
            .with_route("TECHNICAL", StaticHandler::new("technical reply"))
            .with_route("GENERAL", StaticHandler::new("general reply"))
    }

    #[tokio::test]
    async fn each_label_dispatches_to_its_handler() {
        for (classifier, expected_label, expected_reply) in [
            ("BILLING", "BILLING", "billing reply"),
            ("technical", "TECHNICAL", "technical reply"),
            ("  General\n", "GENERAL", "general reply"),
        ] {
            let gateway = Arc::new(ScriptedGateway::texts(&[classifier]));
            let outcome = support_router(gateway).route("query").await.unwrap();
            assert_eq!(outcome.decision, RouteDecision::Matched(expected_label.into()));
            assert_eq!(outcome.response, expected_reply);
        }
    }

    #[tokio::test]
    async fn unknown_label_goes_to_default() {
        let gateway = Arc::new(ScriptedGateway::texts(&["SHIPPING"]));
        let outcome = support_router(gateway).route("Where is my parcel?").await.unwrap();
        assert_eq!(outcome.decision, RouteDecision::Default);
        assert_eq!(outcome.response, "general reply");
        assert_eq!(outcome.classifier_output, "SHIPPING");
    }

    #[test]
    fn priority_order_breaks_ties() {
        let router = support_router(Arc::new(ScriptedGateway::texts(&[])));
        assert_eq!(
            router.decide("technical or maybe billing"),
            RouteDecision::Matched("BILLING".into())
        );
    }

    #[tokio::test]
    async fn classification_is_deterministic() {
        let gateway = Arc::new(ScriptedGateway::texts(&["BILLING"]));
        support_router(gateway.clone()).route("charged twice").await.unwrap();
        let request = &gateway.requests()[0];
        assert_eq!(request.temperature, 0.0);
        let prompt = request.system_prompt().unwrap();
        assert!(prompt.contains("- BILLING\n- TECHNICAL\n- GENERAL"));
    }

    #[tokio::test]
    async fn prompt_handler_uses_persona() {
        let gateway = Arc::new(ScriptedGateway::texts(&["TECHNICAL", "Go to Settings."]));
        let router = Router::new(gateway.clone(), StaticHandler::new("?")).with_route(
            "TECHNICAL",
            PromptHandler::new(gateway.clone(), "You are a Tech Support. Be precise."),
        );
        let outcome = router.route("How do I reset my password?").await.unwrap();
        assert_eq!(outcome.response, "Go to Settings.");
        assert_eq!(
            gateway.requests()[1].system_prompt().as_deref(),
            Some("You are a Tech Support. Be precise.")
        );
        assert_eq!(gateway.user_input(1), "How do I reset my password?");
    }

    #[tokio::test]
    async fn prompt_handler_temperature_leaves_classifier_at_zero() {
        let gateway = Arc::new(ScriptedGateway::texts(&["BILLING", "Refund on its way."]));
        let router = Router::new(gateway.clone(), StaticHandler::new("?")).with_route(
            "BILLING",
            PromptHandler::new(gateway.clone(), "You are a Billing Specialist.").with_temperature(0.4),
        );
        router.route("charged twice").await.unwrap();
        let requests = gateway.requests();
        assert_eq!(requests[0].temperature, 0.0);
        assert_eq!(requests[1].temperature, 0.4);
    }
}
