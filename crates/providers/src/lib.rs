//! Gateway implementations for agentweave.
//!
//! All gateways implement the `agentweave_core::Gateway` trait.
//! [`build_from_config`] picks the right one for the loaded configuration.

pub mod offline;
pub mod openai_compat;

use std::sync::Arc;
use std::time::Duration;

use agentweave_config::AppConfig;
use agentweave_core::Gateway;

pub use offline::{OfflineGateway, SIMULATED_OUTPUT};
pub use openai_compat::OpenAiCompatGateway;

/// Build the gateway described by the configuration.
///
/// Without an API key every call is answered by an [`OfflineGateway`].
pub fn build_from_config(config: &AppConfig) -> Arc<dyn Gateway> {
    match config.api_key.as_deref() {
        Some(api_key) if !api_key.is_empty() => {
            let name = if config.base_url.contains("openrouter.ai") {
                "openrouter"
            } else {
                "openai"
            };
            tracing::info!(gateway = name, model = %config.default_model, "Using OpenAI-compatible gateway");
            Arc::new(OpenAiCompatGateway::with_timeout(
                name,
                &config.base_url,
                api_key,
                &config.default_model,
                Duration::from_secs(config.request_timeout_secs),
            ))
        }
        _ => {
            tracing::warn!("No API key configured, using offline gateway");
            Arc::new(OfflineGateway::new())
        }
    }
}
