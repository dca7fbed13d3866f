//! Agent configuration types for AgentHub.
//!
//! An agent is a named configuration combining a model identifier, a system
//! prompt, and ordered lists of prompt fragments and tool bindings. These
//! types are read-only snapshots at execution time; the core never mutates them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{AgentId, PromptId, RunId, ToolId};
use crate::llm::MessageRole;

/// Model used when an agent does not name one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// System prompt used when the base prompt and every system fragment are empty.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// Output returned when a run produced no text at all.
pub const NO_OUTPUT: &str = "(no output)";

/// Identity of the caller on whose behalf a session is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserIdentity(String);

impl UserIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The executable part of an agent: title, model, and LLM parameters.
///
/// `max_tokens`, `temperature`, and `tags` are carried through unchanged;
/// assembly only reads `title` and `system_prompt`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub title: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl AgentConfig {
    /// The configured model, or `fallback` when absent or blank.
    pub fn model_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.model.as_deref() {
            Some(model) if !model.trim().is_empty() => model,
            _ => fallback,
        }
    }
}

/// An ordered, role-tagged piece of prompt text attached to an agent.
///
/// When `content` is absent and `prompt_id` is set, the caller substitutes the
/// library prompt's content before assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptFragment {
    pub role: MessageRole,
    pub order: i32,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub prompt_id: Option<PromptId>,
}

impl PromptFragment {
    /// A fragment with inline content and no library reference.
    pub fn inline(role: MessageRole, order: i32, content: impl Into<String>) -> Self {
        Self {
            role,
            order,
            content: Some(content.into()),
            prompt_id: None,
        }
    }

    /// True when the fragment must be dereferenced from the prompt library.
    pub fn needs_library_content(&self) -> bool {
        self.prompt_id.is_some() && self.content.as_deref().is_none_or(str::is_empty)
    }
}

fn default_enabled() -> bool {
    true
}

/// A named capability descriptor attached to an agent.
///
/// Carried as data only; execution never invokes the code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolBinding {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub tool_id: Option<ToolId>,
}

/// The two execution inputs derived from an agent configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAgent {
    /// Identifier safe for the runner: `[A-Za-z0-9_]`, starting with a letter or `_`.
    pub sanitized_name: String,
    /// Base system prompt followed by every system fragment in order.
    pub full_system_prompt: String,
}

/// Result of running an agent for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Present only when a persisted agent was run.
    pub agent_id: Option<AgentId>,
    pub title: String,
    /// Never empty; [`NO_OUTPUT`] when the runner produced no text.
    pub output: String,
}

impl ExecutionResult {
    pub fn new(agent_id: Option<AgentId>, title: impl Into<String>, output: String) -> Self {
        let output = if output.is_empty() {
            NO_OUTPUT.to_string()
        } else {
            output
        };
        Self {
            agent_id,
            title: title.into(),
            output,
        }
    }
}

/// Who can see an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Unlisted,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
            Visibility::Unlisted => write!(f, "unlisted"),
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            "unlisted" => Ok(Visibility::Unlisted),
            other => Err(format!("invalid visibility: '{other}'")),
        }
    }
}

/// A persisted agent with its embedded tool and prompt bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    #[serde(flatten)]
    pub config: AgentConfig,
    pub description: Option<String>,
    /// Generated setup/usage documentation.
    pub instructions: Option<String>,
    pub visibility: Visibility,
    pub tools: Vec<ToolBinding>,
    pub prompts: Vec<PromptFragment>,
    pub created_by: UserIdentity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tool binding submitted with an agent, optionally saved to the library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentToolInput {
    #[serde(flatten)]
    pub binding: ToolBinding,
    #[serde(default)]
    pub save_to_library: bool,
}

/// A prompt fragment submitted with an agent, optionally saved to the library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPromptInput {
    #[serde(flatten)]
    pub fragment: PromptFragment,
    #[serde(default)]
    pub save_to_library: bool,
}

/// Request body for creating or replacing an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAgentRequest {
    #[serde(flatten)]
    pub config: AgentConfig,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub tools: Vec<AgentToolInput>,
    #[serde(default)]
    pub prompts: Vec<AgentPromptInput>,
}

/// Inline agent configuration used for a preview run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTestConfig {
    #[serde(flatten)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub prompts: Vec<PromptFragment>,
    #[serde(default)]
    pub tools: Vec<ToolBinding>,
}

/// Request body for `POST /agents/test`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTestRequest {
    pub config: AgentTestConfig,
    pub input: String,
}

/// Request body for `POST /agents/{id}/run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRunRequest {
    pub input: String,
}

/// Outcome of a recorded run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            other => Err(format!("invalid run status: '{other}'")),
        }
    }
}

/// History record of one persisted-agent execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRun {
    pub id: RunId,
    pub agent_id: AgentId,
    pub user_id: UserIdentity,
    pub input: String,
    pub output: Option<String>,
    pub status: RunStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}
