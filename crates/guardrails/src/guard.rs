//! Guard composition helpers.
//!
//! Nothing here wraps a gateway implicitly: callers decide where the
//! filter runs, either on the way in ([`redact_messages`]) or on the way
//! out ([`guarded`]).

use agentweave_core::error::GatewayError;
use agentweave_core::gateway::{Completion, CompletionRequest, Gateway};
use agentweave_core::message::{Content, ContentPart, Message, Role};

use crate::pii::redact;

/// Redact the text of a content value. Image parts pass through untouched.
pub fn redact_content(content: &Content) -> Content {
    match content {
        Content::Text(text) => Content::Text(redact(text)),
        Content::Parts(parts) => Content::Parts(
            parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text { text } => ContentPart::Text { text: redact(text) },
                    image @ ContentPart::ImageUrl { .. } => image.clone(),
                })
                .collect(),
        ),
    }
}

/// Input rail: redact every user message before it reaches the gateway.
///
/// System prompts, assistant turns and tool results are left as they are.
pub fn redact_messages(messages: &[Message]) -> Vec<Message> {
    messages
        .iter()
        .map(|m| match m.role {
            Role::User => Message {
                content: redact_content(&m.content),
                ..m.clone()
            },
            _ => m.clone(),
        })
        .collect()
}

/// Output rail: complete the request and redact the reply text.
///
/// Tool-call requests are returned unchanged; their arguments are consumed
/// by the tool registry, never shown to the user.
pub async fn guarded(
    gateway: &dyn Gateway,
    request: CompletionRequest,
) -> Result<Completion, GatewayError> {
    match gateway.complete(request).await? {
        Completion::Text { content } => Ok(Completion::Text {
            content: redact(&content),
        }),
        calls @ Completion::ToolCalls { .. } => Ok(calls),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentweave_core::gateway::ToolCallRequest;
    use async_trait::async_trait;

    struct FixedGateway(Completion);

    #[async_trait]
    impl Gateway for FixedGateway {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<Completion, GatewayError> {
            Ok(self.0.clone())
        }
    }

    struct FailingGateway;

    #[async_trait]
    impl Gateway for FailingGateway {
        fn name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<Completion, GatewayError> {
            Err(GatewayError::Network("connection refused".into()))
        }
    }

    #[test]
    fn multimodal_parts_keep_images() {
        let image = ContentPart::ImageUrl {
            url: "data:image/jpeg;base64,NTU1LTEyMy00NTY3".into(),
        };
        let content = Content::Parts(vec![
            ContentPart::Text {
                text: "I am jane@example.com".into(),
            },
            image.clone(),
        ]);
        match redact_content(&content) {
            Content::Parts(parts) => {
                assert_eq!(
                    parts[0],
                    ContentPart::Text {
                        text: "I am [REDACTED_EMAIL]".into()
                    }
                );
                assert_eq!(parts[1], image);
            }
            other => panic!("expected parts, got {other:?}"),
        }
    }

    #[test]
    fn input_rail_only_touches_user_messages() {
        let messages = vec![
            Message::system("Escalate to ops@corp.com"),
            Message::user("My number is 555-123-4567"),
        ];
        let out = redact_messages(&messages);
        assert_eq!(out[0].text(), "Escalate to ops@corp.com");
        assert_eq!(out[1].text(), "My number is [REDACTED_PHONE]");
    }

    #[tokio::test]
    async fn output_rail_redacts_text() {
        let gateway = FixedGateway(Completion::text("Reach me at a@b.com"));
        let out = guarded(&gateway, CompletionRequest::new(vec![])).await.unwrap();
        assert_eq!(out, Completion::text("Reach me at [REDACTED_EMAIL]"));
    }

    #[tokio::test]
    async fn output_rail_passes_tool_calls_through() {
        let calls = Completion::ToolCalls {
            calls: vec![ToolCallRequest {
                id: "call_1".into(),
                tool_name: "write_return_manifest".into(),
                arguments: serde_json::json!({"notes": "a@b.com"}),
            }],
        };
        let gateway = FixedGateway(calls.clone());
        let out = guarded(&gateway, CompletionRequest::new(vec![])).await.unwrap();
        assert_eq!(out, calls);
    }

    #[tokio::test]
    async fn gateway_errors_propagate() {
        let err = guarded(&FailingGateway, CompletionRequest::new(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
    }
}
