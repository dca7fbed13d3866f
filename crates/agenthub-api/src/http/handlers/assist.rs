//! Tool-runner assistant handlers: tool simulation and generated docs.

use axum::Json;
use axum::extract::{Path, State};

use agenthub_core::service::assist::ToolSource;
use agenthub_types::assist::{
    AgentInstructionsRequest, AssistOutput, InstallationStepsRequest, ToolInstructionRequest,
};

use crate::http::error::AppError;
use crate::http::extractors::identity::CallerIdentity;
use crate::http::handlers::library::parse_tool_id;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// POST /api/v1/tools/{id}/run - Analyze and simulate a stored tool.
pub async fn run_tool(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AssistOutput>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_tool_id(&id)?;
    let output = state
        .assist_service
        .simulate_tool(&id, &identity, &state.shutdown)
        .await?;
    Ok(Json(timer.respond(output)))
}

/// POST /api/v1/tools/{id}/instructions - Integration guide for a stored tool.
pub async fn tool_instructions(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AssistOutput>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_tool_id(&id)?;
    let output = state
        .assist_service
        .tool_integration_guide(ToolSource::Stored(id), &identity, &state.shutdown)
        .await?;
    Ok(Json(timer.respond(output)))
}

/// POST /api/v1/tools/generate-instructions - Integration guide for an inline tool.
pub async fn generate_tool_instructions(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Json(body): Json<ToolInstructionRequest>,
) -> Result<Json<ApiResponse<AssistOutput>>, AppError> {
    let timer = RequestTimer::start();
    if body.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    let output = state
        .assist_service
        .tool_integration_guide(ToolSource::Inline(body), &identity, &state.shutdown)
        .await?;
    Ok(Json(timer.respond(output)))
}

/// POST /api/v1/ai/generate-installation-steps
pub async fn generate_installation_steps(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Json(body): Json<InstallationStepsRequest>,
) -> Result<Json<ApiResponse<AssistOutput>>, AppError> {
    let timer = RequestTimer::start();
    let output = state
        .assist_service
        .installation_steps(&body, &identity, &state.shutdown)
        .await?;
    Ok(Json(timer.respond(output)))
}

/// POST /api/v1/ai/generate-agent-instructions
pub async fn generate_agent_instructions(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Json(body): Json<AgentInstructionsRequest>,
) -> Result<Json<ApiResponse<AssistOutput>>, AppError> {
    let timer = RequestTimer::start();
    let output = state
        .assist_service
        .agent_instructions(&body, &identity, &state.shutdown)
        .await?;
    Ok(Json(timer.respond(output)))
}
