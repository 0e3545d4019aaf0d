//! Offline gateway used when no API key is configured.

use async_trait::async_trait;
use agentweave_core::error::GatewayError;
use agentweave_core::gateway::{Completion, CompletionRequest, Gateway};
use tracing::debug;

/// The reply every offline call produces unless overridden.
pub const SIMULATED_OUTPUT: &str = "Simulated Output (No API Key)";

/// A gateway that never leaves the process: every call returns the same
/// canned text and never requests tools.
pub struct OfflineGateway {
    reply: String,
}

impl OfflineGateway {
    pub fn new() -> Self {
        Self {
            reply: SIMULATED_OUTPUT.into(),
        }
    }

    /// Use a different canned reply.
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = reply.into();
        self
    }
}

impl Default for OfflineGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Gateway for OfflineGateway {
    fn name(&self) -> &str {
        "offline"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, GatewayError> {
        debug!(messages = request.messages.len(), "Offline gateway returning simulated output");
        Ok(Completion::text(self.reply.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentweave_core::gateway::ToolDeclaration;
    use agentweave_core::message::Message;

    #[tokio::test]
    async fn returns_simulated_text_even_with_tools() {
        let gateway = OfflineGateway::new();
        let request = CompletionRequest::new(vec![Message::user("NVDA?")]).with_tools(vec![
            ToolDeclaration {
                name: "get_news".into(),
                description: "news".into(),
                input_schema: serde_json::json!({"type": "object"}),
            },
        ]);
        let completion = gateway.complete(request).await.unwrap();
        assert_eq!(completion, Completion::text(SIMULATED_OUTPUT));
    }

    #[tokio::test]
    async fn custom_reply() {
        let gateway = OfflineGateway::new().with_reply("Final Answer: offline");
        let out = gateway
            .complete(CompletionRequest::new(vec![]))
            .await
            .unwrap()
            .into_text()
            .unwrap();
        assert_eq!(out, "Final Answer: offline");
    }
}
