//! Configuration loading, validation, and management for agentweave.
//!
//! Loads configuration from `~/.agentweave/config.toml` (or an explicit
//! path) with environment variable overrides. Validates all settings at
//! startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.agentweave/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the OpenAI-compatible endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default sampling temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// HTTP request timeout for gateway calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pattern runner settings
    #[serde(default)]
    pub patterns: PatternsConfig,

    /// Span tracing settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Response cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

/// Endpoint used when the key comes from `OPENROUTER_API_KEY`.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_request_timeout_secs() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("patterns", &self.patterns)
            .field("telemetry", &self.telemetry)
            .field("cache", &self.cache)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternsConfig {
    /// Draft/evaluate rounds before the evaluator-optimizer gives up
    #[serde(default = "default_evaluator_max_iterations")]
    pub evaluator_max_iterations: u32,

    /// Per-branch timeout for scatter-gather; `None` waits indefinitely
    #[serde(default = "default_scatter_branch_timeout_secs")]
    pub scatter_branch_timeout_secs: Option<u64>,

    /// Number of sub-tasks the orchestrator asks the planner for
    #[serde(default = "default_orchestrator_subtasks")]
    pub orchestrator_subtasks: usize,

    /// Run orchestrator workers concurrently instead of in sequence
    #[serde(default)]
    pub orchestrator_concurrent: bool,

    /// Turn limit for the tool-calling and ReAct agents
    #[serde(default = "default_agent_max_turns")]
    pub agent_max_turns: u32,
}

fn default_evaluator_max_iterations() -> u32 {
    3
}
fn default_scatter_branch_timeout_secs() -> Option<u64> {
    Some(60)
}
fn default_orchestrator_subtasks() -> usize {
    2
}
fn default_agent_max_turns() -> u32 {
    5
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            evaluator_max_iterations: default_evaluator_max_iterations(),
            scatter_branch_timeout_secs: default_scatter_branch_timeout_secs(),
            orchestrator_subtasks: default_orchestrator_subtasks(),
            orchestrator_concurrent: false,
            agent_max_turns: default_agent_max_turns(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Append-only JSONL file receiving one record per completed span
    #[serde(default = "default_trace_file")]
    pub trace_file: PathBuf,
}

fn default_trace_file() -> PathBuf {
    PathBuf::from("agent_traces.jsonl")
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            trace_file: default_trace_file(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum cached prompts; unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
}

impl AppConfig {
    /// Load configuration from the default location with env var overrides.
    ///
    /// Priority: env vars > config file > defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let config = Self::load_from(&config_path)?;
        Ok(config.with_env_overrides())
    }

    /// Load from an explicit path, then apply env var overrides.
    pub fn load_with_overrides(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::load_from(path)?.with_env_overrides())
    }

    /// Apply environment variable overrides.
    fn with_env_overrides(self) -> Self {
        self.apply_env(|var| std::env::var(var).ok())
    }

    /// Apply overrides from `lookup`. An OpenRouter key moves a default base
    /// URL and model to their OpenRouter forms; the explicit
    /// `AGENTWEAVE_BASE_URL` and `AGENTWEAVE_MODEL` still win.
    fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        for var in ["AGENTWEAVE_API_KEY", "OPENAI_API_KEY", "OPENROUTER_API_KEY"] {
            if let Some(key) = lookup(var)
                && !key.is_empty()
            {
                self.api_key = Some(key);
                if var == "OPENROUTER_API_KEY" && self.base_url == default_base_url() {
                    self.base_url = OPENROUTER_BASE_URL.into();
                    if self.default_model == default_model() {
                        self.default_model = format!("openai/{}", self.default_model);
                    }
                }
                break;
            }
        }

        if let Some(model) = lookup("AGENTWEAVE_MODEL") {
            self.default_model = model;
        }

        if let Some(url) = lookup("AGENTWEAVE_BASE_URL") {
            self.base_url = url;
        }

        self
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".agentweave")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.patterns.evaluator_max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "patterns.evaluator_max_iterations must be at least 1".into(),
            ));
        }

        if self.patterns.orchestrator_subtasks == 0 {
            return Err(ConfigError::ValidationError(
                "patterns.orchestrator_subtasks must be at least 1".into(),
            ));
        }

        if self.patterns.agent_max_turns == 0 {
            return Err(ConfigError::ValidationError(
                "patterns.agent_max_turns must be at least 1".into(),
            ));
        }

        if self.patterns.scatter_branch_timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "patterns.scatter_branch_timeout_secs must be at least 1 when set".into(),
            ));
        }

        if self.cache.capacity == Some(0) {
            return Err(ConfigError::ValidationError(
                "cache.capacity must be at least 1 when set".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            patterns: PatternsConfig::default(),
            telemetry: TelemetryConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.patterns.evaluator_max_iterations, 3);
        assert_eq!(config.patterns.agent_max_turns, 5);
        assert!(config.cache.capacity.is_none());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_model, config.default_model);
        assert_eq!(parsed.telemetry.trace_file, config.telemetry.trace_file);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_iteration_ceiling_rejected() {
        let mut config = AppConfig::default();
        config.patterns.evaluator_max_iterations = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("evaluator_max_iterations"));
    }

    #[test]
    fn zero_branch_timeout_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[patterns]\nscatter_branch_timeout_secs = 0\n").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("scatter_branch_timeout_secs"));
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }

    #[test]
    fn openrouter_key_switches_default_base_url() {
        let config = AppConfig::default().apply_env(env(&[("OPENROUTER_API_KEY", "sk-or-1")]));
        assert_eq!(config.api_key.as_deref(), Some("sk-or-1"));
        assert_eq!(config.base_url, OPENROUTER_BASE_URL);
        assert_eq!(config.default_model, "openai/gpt-4o");
    }

    #[test]
    fn openrouter_key_keeps_configured_or_explicit_base_url() {
        let custom = AppConfig {
            base_url: "http://localhost:8080/v1".into(),
            ..AppConfig::default()
        }
        .apply_env(env(&[("OPENROUTER_API_KEY", "sk-or-1")]));
        assert_eq!(custom.base_url, "http://localhost:8080/v1");

        let explicit = AppConfig::default().apply_env(env(&[
            ("OPENROUTER_API_KEY", "sk-or-1"),
            ("AGENTWEAVE_BASE_URL", "http://proxy/v1"),
        ]));
        assert_eq!(explicit.base_url, "http://proxy/v1");
    }

    #[test]
    fn openai_key_takes_precedence_and_keeps_openai_url() {
        let config = AppConfig::default().apply_env(env(&[
            ("OPENAI_API_KEY", "sk-openai"),
            ("OPENROUTER_API_KEY", "sk-or-1"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("sk-openai"));
        assert_eq!(config.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_model = "gpt-4o-mini"

[patterns]
orchestrator_subtasks = 3
orchestrator_concurrent = true

[cache]
capacity = 128
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.patterns.orchestrator_subtasks, 3);
        assert!(config.patterns.orchestrator_concurrent);
        assert_eq!(config.patterns.evaluator_max_iterations, 3);
        assert_eq!(config.cache.capacity, Some(128));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_temperature = \"hot\"").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret-value".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret-value"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-4o"));
        assert!(toml_str.contains("agent_traces.jsonl"));
    }
}
