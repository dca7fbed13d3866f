//! LLM provider implementations.
//!
//! Contains the OpenAI-compatible implementation of the [`LlmProvider`]
//! trait defined in `agenthub-core`, and [`LlmRunnerFactory`], which picks a
//! provider from the model prefix and hands the execution adapter a fresh
//! [`LlmAgentRunner`] per run.
//!
//! [`LlmProvider`]: agenthub_core::llm::provider::LlmProvider

pub mod openai_compat;

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use agenthub_core::llm::box_provider::BoxLlmProvider;
use agenthub_core::runner::llm::LlmAgentRunner;
use agenthub_core::runner::{AgentDefinition, RunnerFactory};
use agenthub_types::config::GlobalConfig;
use agenthub_types::runner::RunnerError;

use self::openai_compat::config::{OpenAiCompatConfig, ProviderKind};
use self::openai_compat::OpenAiCompatibleProvider;

/// Endpoint and credential for one provider kind.
struct ProviderEndpoint {
    base_url: String,
    api_key_env: String,
    api_key: Option<SecretString>,
}

/// Builds [`LlmAgentRunner`]s backed by OpenAI-compatible providers.
///
/// Base URLs and API keys are resolved once at construction; a missing key
/// only fails the runs that need that provider.
pub struct LlmRunnerFactory {
    endpoints: HashMap<ProviderKind, ProviderEndpoint>,
    default_max_tokens: u32,
}

impl LlmRunnerFactory {
    /// Resolve endpoints from `config` and API keys from the environment.
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self::with_key_lookup(config, |name| std::env::var(name).ok())
    }

    /// Resolve endpoints from `config`, reading API keys through `lookup`.
    pub fn with_key_lookup(config: &GlobalConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let endpoints = ProviderKind::ALL
            .into_iter()
            .map(|kind| {
                let overrides = config.providers.get(kind.prefix());
                let base_url = overrides
                    .and_then(|o| o.base_url.clone())
                    .unwrap_or_else(|| kind.default_base_url().to_string());
                let api_key_env = overrides
                    .and_then(|o| o.api_key_env.clone())
                    .unwrap_or_else(|| kind.default_api_key_env().to_string());
                let api_key = lookup(&api_key_env)
                    .filter(|key| !key.trim().is_empty())
                    .map(SecretString::from);
                (
                    kind,
                    ProviderEndpoint {
                        base_url,
                        api_key_env,
                        api_key,
                    },
                )
            })
            .collect();

        Self {
            endpoints,
            default_max_tokens: config.max_tokens,
        }
    }

    /// Build the provider serving `model`. Returns the provider-side model name too.
    pub fn provider_for(&self, model: &str) -> Result<(BoxLlmProvider, String), RunnerError> {
        let (kind, provider_model) = ProviderKind::split_model(model);
        let endpoint = self
            .endpoints
            .get(&kind)
            .ok_or_else(|| RunnerError::Setup(format!("provider '{kind}' is not configured")))?;
        let api_key = endpoint.api_key.as_ref().ok_or_else(|| {
            RunnerError::Setup(format!(
                "no API key for provider '{kind}': set {}",
                endpoint.api_key_env
            ))
        })?;

        let config = OpenAiCompatConfig::for_kind(
            kind,
            SecretString::from(api_key.expose_secret().to_string()),
            provider_model,
            Some(&endpoint.base_url),
        );
        debug!(provider = %kind, model = provider_model, base_url = %endpoint.base_url, "provider selected");
        Ok((
            BoxLlmProvider::new(OpenAiCompatibleProvider::new(config)),
            provider_model.to_string(),
        ))
    }
}

impl RunnerFactory for LlmRunnerFactory {
    type Runner = LlmAgentRunner;

    fn build(&self, mut definition: AgentDefinition) -> Result<LlmAgentRunner, RunnerError> {
        let (provider, provider_model) = self.provider_for(&definition.model)?;
        definition.model = provider_model;
        Ok(LlmAgentRunner::new(
            definition,
            provider,
            self.default_max_tokens,
        ))
    }
}
