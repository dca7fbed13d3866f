//! Agent runner types: sessions, messages, and the events a runner emits.
//!
//! A runner turns a session + one user message into an ordered stream of
//! [`RunnerEvent`]s. Text can surface in three shapes, modelled as variants
//! of a tagged union rather than inspected ad hoc.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::UserIdentity;
use crate::llm::{LlmError, MessageRole};

/// Identifier of a runner session. Freshly generated per execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An isolated conversational context, created right before a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// Application scope the session belongs to (e.g. "AgentHub").
    pub app_name: String,
    pub user: UserIdentity,
    pub created_at: DateTime<Utc>,
}

/// One part of a message or event payload.
///
/// Text arrives either as a typed text part or as an arbitrary JSON object
/// carrying a string `text` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    Data(serde_json::Value),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    /// The text carried by this part, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            Part::Data(serde_json::Value::Object(map)) => {
                map.get("text").and_then(serde_json::Value::as_str)
            }
            Part::Data(_) => None,
        }
    }
}

/// A message submitted to a runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessage {
    pub role: MessageRole,
    pub parts: Vec<Part>,
}

impl UserMessage {
    /// A user-role message whose only part is `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated text of every part.
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }
}

/// An event emitted by a runner while processing a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunnerEvent {
    /// Agent state update. A non-empty `output` key is the authoritative answer.
    AgentState {
        state: serde_json::Map<String, serde_json::Value>,
    },
    /// Raw model response parts.
    ModelResponse { parts: Vec<Part> },
    /// Generic content parts.
    Content { parts: Vec<Part> },
}

impl RunnerEvent {
    /// Agent-state event carrying `output`.
    pub fn agent_output(output: impl Into<String>) -> Self {
        let mut state = serde_json::Map::new();
        state.insert(
            "output".to_string(),
            serde_json::Value::String(output.into()),
        );
        RunnerEvent::AgentState { state }
    }

    pub fn content_text(text: impl Into<String>) -> Self {
        RunnerEvent::Content {
            parts: vec![Part::text(text)],
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        RunnerEvent::ModelResponse {
            parts: vec![Part::text(text)],
        }
    }

    /// The authoritative output, when this is an agent-state event with a
    /// non-empty string `output`.
    pub fn authoritative_output(&self) -> Option<&str> {
        match self {
            RunnerEvent::AgentState { state } => state
                .get("output")
                .and_then(serde_json::Value::as_str)
                .filter(|s| !s.is_empty()),
            _ => None,
        }
    }

    /// Concatenated text of the event's parts (model response or content).
    pub fn part_text(&self) -> Option<String> {
        let parts = match self {
            RunnerEvent::ModelResponse { parts } | RunnerEvent::Content { parts } => parts,
            RunnerEvent::AgentState { .. } => return None,
        };
        let texts: Vec<&str> = parts.iter().filter_map(Part::as_text).collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }
}

/// How part text from successive events is reduced into one output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputPolicy {
    /// Concatenate text from every event in emission order.
    #[default]
    Accumulate,
    /// Keep only the text of the most recent event that carried any.
    LastBlock,
}

impl fmt::Display for OutputPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputPolicy::Accumulate => write!(f, "accumulate"),
            OutputPolicy::LastBlock => write!(f, "last_block"),
        }
    }
}

impl FromStr for OutputPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accumulate" => Ok(OutputPolicy::Accumulate),
            "last_block" => Ok(OutputPolicy::LastBlock),
            other => Err(format!("invalid output policy: '{other}'")),
        }
    }
}

/// Errors raised by a runner or its session store.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("session '{0}' already exists")]
    SessionExists(SessionId),

    #[error("session '{0}' not found")]
    SessionNotFound(SessionId),

    #[error("runner setup failed: {0}")]
    Setup(String),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Terminal failure of a single execution. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("session creation failed: {0}")]
    SessionCreation(#[source] RunnerError),

    #[error("runner failed: {0}")]
    Stream(#[source] RunnerError),

    #[error("execution timed out after {after_ms}ms")]
    TimedOut { after_ms: u64 },

    #[error("execution cancelled")]
    Cancelled,
}
