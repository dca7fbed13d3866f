//! Library prompt and tool handlers.

use axum::Json;
use axum::extract::{Path, State};

use agenthub_types::id::{PromptId, ToolId};
use agenthub_types::library::{CreatePromptRequest, CreateToolRequest, Prompt, Tool};

use crate::http::error::AppError;
use crate::http::extractors::identity::CallerIdentity;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

pub(crate) fn parse_tool_id(raw: &str) -> Result<ToolId, AppError> {
    raw.parse::<ToolId>()
        .map_err(|_| AppError::NotFound(format!("tool '{raw}' not found")))
}

fn parse_prompt_id(raw: &str) -> Result<PromptId, AppError> {
    raw.parse::<PromptId>()
        .map_err(|_| AppError::NotFound(format!("prompt '{raw}' not found")))
}

/// POST /api/v1/prompts - Publish a prompt.
pub async fn create_prompt(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Json(body): Json<CreatePromptRequest>,
) -> Result<Json<ApiResponse<Prompt>>, AppError> {
    let timer = RequestTimer::start();
    let prompt = state.library_service.create_prompt(&identity, body).await?;
    let href = format!("/api/v1/prompts/{}", prompt.id);
    Ok(Json(timer.respond(prompt).with_link("self", href)))
}

/// GET /api/v1/prompts/{id} - Fetch a published prompt.
pub async fn get_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Prompt>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_prompt_id(&id)?;
    let prompt = state.library_service.get_prompt(&id).await?;
    Ok(Json(
        timer
            .respond(prompt)
            .with_link("self", format!("/api/v1/prompts/{id}")),
    ))
}

/// PUT /api/v1/prompts/{id} - Replace a prompt (owner only).
pub async fn update_prompt(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
    Json(body): Json<CreatePromptRequest>,
) -> Result<Json<ApiResponse<Prompt>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_prompt_id(&id)?;
    let prompt = state
        .library_service
        .update_prompt(&id, &identity, body)
        .await?;
    Ok(Json(
        timer
            .respond(prompt)
            .with_link("self", format!("/api/v1/prompts/{id}")),
    ))
}

/// DELETE /api/v1/prompts/{id} - Delete a prompt (owner only).
pub async fn delete_prompt(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_prompt_id(&id)?;
    state.library_service.delete_prompt(&id, &identity).await?;
    Ok(Json(timer.respond(serde_json::json!({ "deleted": true }))))
}

/// POST /api/v1/tools - Publish a tool.
pub async fn create_tool(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Json(body): Json<CreateToolRequest>,
) -> Result<Json<ApiResponse<Tool>>, AppError> {
    let timer = RequestTimer::start();
    let tool = state.library_service.create_tool(&identity, body).await?;
    let href = format!("/api/v1/tools/{}", tool.id);
    Ok(Json(timer.respond(tool).with_link("self", href)))
}

/// GET /api/v1/tools/{id} - Fetch a published tool.
pub async fn get_tool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Tool>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_tool_id(&id)?;
    let tool = state.library_service.get_tool(&id).await?;
    Ok(Json(
        timer
            .respond(tool)
            .with_link("self", format!("/api/v1/tools/{id}"))
            .with_link("run", format!("/api/v1/tools/{id}/run")),
    ))
}

/// PUT /api/v1/tools/{id} - Replace a tool (owner only).
pub async fn update_tool(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
    Json(body): Json<CreateToolRequest>,
) -> Result<Json<ApiResponse<Tool>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_tool_id(&id)?;
    let tool = state.library_service.update_tool(&id, &identity, body).await?;
    Ok(Json(
        timer
            .respond(tool)
            .with_link("self", format!("/api/v1/tools/{id}")),
    ))
}

/// DELETE /api/v1/tools/{id} - Delete a tool (owner only).
pub async fn delete_tool(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_tool_id(&id)?;
    state.library_service.delete_tool(&id, &identity).await?;
    Ok(Json(timer.respond(serde_json::json!({ "deleted": true }))))
}
