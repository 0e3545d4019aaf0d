pub mod agent;
pub mod chain;
pub mod orchestrate;
pub mod react;
pub mod refine;
pub mod route;
pub mod scatter;
pub mod secure;

use std::path::Path;
use std::sync::Arc;

use agentweave_config::AppConfig;
use agentweave_core::Gateway;
use tracing::debug;

/// Loaded configuration plus the gateway every command shares.
pub struct Context {
    pub config: AppConfig,
    pub gateway: Arc<dyn Gateway>,
}

impl Context {
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = match path {
            Some(path) => AppConfig::load_with_overrides(path),
            None => AppConfig::load(),
        }
        .map_err(|e| format!("Failed to load config: {e}"))?;

        if !config.has_api_key() {
            eprintln!("  WARNING: No API key found. Results will be simulated.");
            eprintln!(
                "  Set OPENAI_API_KEY or add api_key to {}",
                AppConfig::config_dir().join("config.toml").display()
            );
            eprintln!();
        }

        let gateway = agentweave_providers::build_from_config(&config);
        debug!(gateway = gateway.name(), model = %config.default_model, "Context ready");
        Ok(Self { config, gateway })
    }

    #[cfg(test)]
    pub fn offline() -> Self {
        Self {
            config: AppConfig::default(),
            gateway: Arc::new(agentweave_providers::OfflineGateway::new()),
        }
    }
}

/// Print one labelled demo step.
pub fn print_step(pattern: &str, step: &str, content: &str) {
    println!();
    println!("  [{pattern}] {step}: {content}");
}
