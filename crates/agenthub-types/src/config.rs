//! Global configuration types for AgentHub.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! execution adapter (model default, timeout, output reduction) and provider
//! endpoints.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agent::DEFAULT_MODEL;
use crate::runner::OutputPolicy;

/// Top-level configuration for the AgentHub backend.
///
/// Loaded from `~/.agenthub/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// App scope under which runner sessions are created.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Model used when an agent does not name one.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Upper bound on a single execution, session creation included.
    #[serde(default = "default_execution_timeout_secs")]
    pub execution_timeout_secs: u64,

    #[serde(default)]
    pub output_policy: OutputPolicy,

    /// Identity used for requests that carry no `X-User-Id`.
    #[serde(default = "default_anonymous_identity")]
    pub anonymous_identity: String,

    /// Completion token cap when an agent does not set `max_tokens`.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-provider overrides keyed by model prefix ("openai", "gemini", ...).
    #[serde(default)]
    pub providers: HashMap<String, ProviderOverride>,
}

fn default_app_name() -> String {
    "AgentHub".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_execution_timeout_secs() -> u64 {
    120
}

fn default_anonymous_identity() -> String {
    "anonymous".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

impl GlobalConfig {
    /// Execution timeout, never shorter than one second.
    pub fn execution_timeout(&self) -> Duration {
        Duration::from_secs(self.execution_timeout_secs.max(1))
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            default_model: default_model(),
            execution_timeout_secs: default_execution_timeout_secs(),
            output_policy: OutputPolicy::default(),
            anonymous_identity: default_anonymous_identity(),
            max_tokens: default_max_tokens(),
            providers: HashMap::new(),
        }
    }
}

/// Endpoint override for one provider prefix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderOverride {
    /// Replaces the provider's default base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Environment variable holding the API key, replacing the default name.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.app_name, "AgentHub");
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.execution_timeout_secs, 120);
        assert_eq!(config.output_policy, OutputPolicy::Accumulate);
        assert_eq!(config.anonymous_identity, "anonymous");
        assert_eq!(config.max_tokens, 4096);
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.app_name, "AgentHub");
        assert_eq!(config.execution_timeout_secs, 120);
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
app_name = "AgentHub-staging"
default_model = "gemini/gemini-2.5-flash"
execution_timeout_secs = 30
output_policy = "last_block"

[providers.gemini]
api_key_env = "GOOGLE_API_KEY"

[providers.openai]
base_url = "http://localhost:11434/v1"
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.app_name, "AgentHub-staging");
        assert_eq!(config.default_model, "gemini/gemini-2.5-flash");
        assert_eq!(config.output_policy, OutputPolicy::LastBlock);
        assert_eq!(
            config.providers["gemini"].api_key_env.as_deref(),
            Some("GOOGLE_API_KEY")
        );
        assert_eq!(
            config.providers["openai"].base_url.as_deref(),
            Some("http://localhost:11434/v1")
        );
    }

    #[test]
    fn test_execution_timeout_floor() {
        let config = GlobalConfig {
            execution_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.execution_timeout(), Duration::from_secs(1));
    }
}
