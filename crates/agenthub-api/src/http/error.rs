//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use agenthub_types::error::{AgentError, LibraryError, RepositoryError};
use agenthub_types::runner::ExecutionError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Agent, execution, and assist errors.
    Agent(AgentError),
    /// Library prompt/tool errors.
    Library(LibraryError),
    /// Malformed request input.
    Validation(String),
    /// Unknown or unparseable resource id.
    NotFound(String),
    /// Generic internal error.
    Internal(String),
}

impl From<AgentError> for AppError {
    fn from(e: AgentError) -> Self {
        AppError::Agent(e)
    }
}

impl From<LibraryError> for AppError {
    fn from(e: LibraryError) -> Self {
        AppError::Library(e)
    }
}

fn storage_status(e: &RepositoryError) -> (StatusCode, &'static str) {
    match e {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        RepositoryError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
    }
}

fn execution_status(e: &ExecutionError) -> (StatusCode, &'static str) {
    match e {
        ExecutionError::SessionCreation(_) => {
            (StatusCode::BAD_GATEWAY, "SESSION_CREATION_FAILED")
        }
        ExecutionError::Stream(_) => (StatusCode::BAD_GATEWAY, "EXECUTION_FAILED"),
        ExecutionError::TimedOut { .. } => (StatusCode::GATEWAY_TIMEOUT, "EXECUTION_TIMED_OUT"),
        ExecutionError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "EXECUTION_CANCELLED"),
    }
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Agent(e) => match e {
                AgentError::AgentNotFound(_) => (StatusCode::NOT_FOUND, "AGENT_NOT_FOUND"),
                AgentError::PromptNotFound(_) => (StatusCode::NOT_FOUND, "PROMPT_NOT_FOUND"),
                AgentError::ToolNotFound(_) => (StatusCode::NOT_FOUND, "TOOL_NOT_FOUND"),
                AgentError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                AgentError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                AgentError::Storage(e) => storage_status(e),
                AgentError::Execution(e) => execution_status(e),
            },
            AppError::Library(e) => match e {
                LibraryError::PromptNotFound(_) => (StatusCode::NOT_FOUND, "PROMPT_NOT_FOUND"),
                LibraryError::ToolNotFound(_) => (StatusCode::NOT_FOUND, "TOOL_NOT_FOUND"),
                LibraryError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                LibraryError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                LibraryError::Storage(e) => storage_status(e),
            },
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Agent(e) => e.to_string(),
            AppError::Library(e) => e.to_string(),
            AppError::Validation(msg) | AppError::NotFound(msg) | AppError::Internal(msg) => {
                msg.clone()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.message();
        if status.is_server_error() {
            warn!(code, error = %message, "request failed");
        }

        let request_id = uuid::Uuid::now_v7().to_string();
        let body = serde_json::to_string(&ApiResponse::error(code, &message, request_id, 0))
            .unwrap_or_else(|_| {
                r#"{"errors":[{"code":"SERIALIZATION_ERROR","message":"Failed to serialize response"}]}"#.to_string()
            });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
