//! Agent definition assembler.
//!
//! Turns an agent configuration plus its prompt fragments into the two inputs
//! the runner needs: a runner-safe agent name and one resolved system prompt.
//! Pure and deterministic; library prompts must already be dereferenced.

use agenthub_types::agent::{AgentConfig, DEFAULT_SYSTEM_PROMPT, PromptFragment, ResolvedAgent};
use agenthub_types::llm::MessageRole;

/// Stateless assembler for [`ResolvedAgent`]s.
///
/// Layout of the resolved prompt:
/// ```text
/// {config.system_prompt}
/// {system fragment, lowest order}
/// {system fragment, next order}
/// ...
/// ```
pub struct AgentAssembler;

impl AgentAssembler {
    /// Resolve a configuration and its fragments.
    ///
    /// Fragments are applied in ascending `order`; equal orders keep their
    /// input sequence. Only `system` fragments contribute, each appended after
    /// a newline (absent content counts as empty). An empty result falls back
    /// to [`DEFAULT_SYSTEM_PROMPT`].
    pub fn resolve(config: &AgentConfig, fragments: &[PromptFragment]) -> ResolvedAgent {
        let mut ordered: Vec<&PromptFragment> = fragments.iter().collect();
        // sort_by_key is stable
        ordered.sort_by_key(|fragment| fragment.order);

        let mut prompt = config.system_prompt.clone();
        for fragment in ordered
            .into_iter()
            .filter(|fragment| fragment.role == MessageRole::System)
        {
            prompt.push('\n');
            prompt.push_str(fragment.content.as_deref().unwrap_or_default());
        }

        let full_system_prompt = if prompt.is_empty() {
            DEFAULT_SYSTEM_PROMPT.to_string()
        } else {
            prompt
        };

        ResolvedAgent {
            sanitized_name: sanitize_agent_name(&config.title),
            full_system_prompt,
        }
    }
}

/// Convert a display title into an identifier the runner accepts.
///
/// Every character outside `[A-Za-z0-9_]` becomes `_`. An empty result is
/// `agent`; a result starting with a digit gets an `agent_` prefix.
pub fn sanitize_agent_name(title: &str) -> String {
    let name: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    match name.chars().next() {
        None => "agent".to_string(),
        Some(first) if first.is_ascii_alphabetic() || first == '_' => name,
        Some(_) => format!("agent_{name}"),
    }
}
