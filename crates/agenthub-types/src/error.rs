use thiserror::Error;

use crate::id::{AgentId, PromptId, ToolId};
use crate::runner::ExecutionError;

/// Errors from repository operations (used by trait definitions in agenthub-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors related to agent operations, including execution.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent '{0}' not found")]
    AgentNotFound(AgentId),

    #[error("prompt '{0}' not found")]
    PromptNotFound(PromptId),

    #[error("tool '{0}' not found")]
    ToolNotFound(ToolId),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("agent '{0}' is owned by another user")]
    Forbidden(AgentId),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// Errors related to library prompt/tool operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("prompt '{0}' not found")]
    PromptNotFound(PromptId),

    #[error("tool '{0}' not found")]
    ToolNotFound(ToolId),

    #[error("validation failed: {0}")]
    Validation(String),

    /// Holds the record label, e.g. `prompt '<id>'`.
    #[error("{0} is owned by another user")]
    Forbidden(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}
