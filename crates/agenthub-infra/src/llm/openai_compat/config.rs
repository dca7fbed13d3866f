//! Provider kinds and per-provider defaults for OpenAI-compatible endpoints.
//!
//! Models are addressed LiteLLM-style: `gemini/gemini-2.5-flash` selects the
//! Gemini endpoint and sends `gemini-2.5-flash` as the model name. A bare
//! model name goes to OpenAI.

use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;

/// The OpenAI-compatible endpoints AgentHub can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
    Mistral,
    Groq,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::OpenAi,
        ProviderKind::Gemini,
        ProviderKind::Mistral,
        ProviderKind::Groq,
    ];

    /// Prefix used in model identifiers and as the `[providers.*]` config key.
    pub fn prefix(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Mistral => "mistral",
            ProviderKind::Groq => "groq",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            ProviderKind::Mistral => "https://api.mistral.ai/v1",
            ProviderKind::Groq => "https://api.groq.com/openai/v1",
        }
    }

    /// Environment variable holding the API key unless overridden in config.
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::Mistral => "MISTRAL_API_KEY",
            ProviderKind::Groq => "GROQ_API_KEY",
        }
    }

    /// Split a model identifier into its provider and the provider-side name.
    ///
    /// Unknown prefixes are left in place and routed to OpenAI, so names such
    /// as `ft:gpt-4o-mini:org/custom` survive untouched.
    pub fn split_model(model: &str) -> (ProviderKind, &str) {
        if let Some((prefix, rest)) = model.split_once('/') {
            if let Ok(kind) = prefix.parse::<ProviderKind>() {
                return (kind, rest);
            }
        }
        (ProviderKind::OpenAi, model)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" => Ok(ProviderKind::Gemini),
            "mistral" => Ok(ProviderKind::Mistral),
            "groq" => Ok(ProviderKind::Groq),
            other => Err(format!("unknown provider: '{other}'")),
        }
    }
}

/// Configuration for one OpenAI-compatible provider instance.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    pub provider_name: String,
    pub base_url: String,
    pub api_key: SecretString,
    /// Provider-side model name, prefix already stripped.
    pub model: String,
}

impl OpenAiCompatConfig {
    /// Defaults for `kind`, optionally pointing at a different base URL.
    pub fn for_kind(
        kind: ProviderKind,
        api_key: SecretString,
        model: &str,
        base_url: Option<&str>,
    ) -> Self {
        Self {
            provider_name: kind.prefix().to_string(),
            base_url: base_url.unwrap_or(kind.default_base_url()).to_string(),
            api_key,
            model: model.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_split_model_known_prefixes() {
        assert_eq!(
            ProviderKind::split_model("gemini/gemini-2.5-flash"),
            (ProviderKind::Gemini, "gemini-2.5-flash")
        );
        assert_eq!(
            ProviderKind::split_model("groq/llama-3.3-70b-versatile"),
            (ProviderKind::Groq, "llama-3.3-70b-versatile")
        );
        assert_eq!(
            ProviderKind::split_model("openai/gpt-4o"),
            (ProviderKind::OpenAi, "gpt-4o")
        );
        assert_eq!(
            ProviderKind::split_model("Mistral/mistral-large-latest"),
            (ProviderKind::Mistral, "mistral-large-latest")
        );
    }

    #[test]
    fn test_split_model_bare_and_unknown_prefix() {
        assert_eq!(
            ProviderKind::split_model("gpt-4o-mini"),
            (ProviderKind::OpenAi, "gpt-4o-mini")
        );
        assert_eq!(
            ProviderKind::split_model("ft:gpt-4o-mini:org/custom"),
            (ProviderKind::OpenAi, "ft:gpt-4o-mini:org/custom")
        );
    }

    #[test]
    fn test_provider_kind_display_parse() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.to_string().parse::<ProviderKind>().unwrap(), kind);
        }
        assert!("anthropic".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_for_kind_uses_override_base_url() {
        let config = OpenAiCompatConfig::for_kind(
            ProviderKind::Groq,
            SecretString::from("gsk-test".to_string()),
            "llama-3.3-70b-versatile",
            Some("http://localhost:8080/v1"),
        );
        assert_eq!(config.provider_name, "groq");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.api_key.expose_secret(), "gsk-test");

        let config = OpenAiCompatConfig::for_kind(
            ProviderKind::Gemini,
            SecretString::from("key".to_string()),
            "gemini-2.5-pro",
            None,
        );
        assert_eq!(
            config.base_url,
            "https://generativelanguage.googleapis.com/v1beta/openai"
        );
    }
}
