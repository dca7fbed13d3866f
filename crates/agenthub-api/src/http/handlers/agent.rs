//! Agent CRUD and execution handlers for the REST API.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use agenthub_types::agent::{
    Agent, AgentRun, AgentRunRequest, AgentTestRequest, CreateAgentRequest, ExecutionResult,
};
use agenthub_types::id::AgentId;

use crate::http::error::AppError;
use crate::http::extractors::identity::CallerIdentity;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// Query parameters for `GET /agents/{id}/runs`.
#[derive(Debug, Deserialize)]
pub struct RunListQuery {
    #[serde(default = "default_run_limit")]
    pub limit: i64,
}

fn default_run_limit() -> i64 {
    20
}

pub(crate) fn parse_agent_id(raw: &str) -> Result<AgentId, AppError> {
    raw.parse::<AgentId>()
        .map_err(|_| AppError::NotFound(format!("agent '{raw}' not found")))
}

fn agent_response(timer: RequestTimer, agent: Agent) -> ApiResponse<Agent> {
    let id = agent.id.clone();
    timer
        .respond(agent)
        .with_link("self", format!("/api/v1/agents/{id}"))
        .with_link("run", format!("/api/v1/agents/{id}/run"))
        .with_link("runs", format!("/api/v1/agents/{id}/runs"))
}

/// POST /api/v1/agents - Create an agent owned by the caller.
pub async fn create_agent(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Json(body): Json<CreateAgentRequest>,
) -> Result<Json<ApiResponse<Agent>>, AppError> {
    let timer = RequestTimer::start();
    let agent = state.agent_service.create_agent(&identity, body).await?;
    Ok(Json(agent_response(timer, agent)))
}

/// GET /api/v1/agents/{id} - Fetch a single agent.
pub async fn get_agent(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Agent>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_agent_id(&id)?;
    let agent = state.agent_service.view_agent(&id, &identity).await?;
    Ok(Json(agent_response(timer, agent)))
}

/// PUT /api/v1/agents/{id} - Replace an agent's configuration and bindings.
pub async fn update_agent(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
    Json(body): Json<CreateAgentRequest>,
) -> Result<Json<ApiResponse<Agent>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_agent_id(&id)?;
    let agent = state
        .agent_service
        .update_agent(&id, &identity, body)
        .await?;
    Ok(Json(agent_response(timer, agent)))
}

/// DELETE /api/v1/agents/{id} - Delete an agent.
pub async fn delete_agent(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_agent_id(&id)?;
    state.agent_service.delete_agent(&id, &identity).await?;
    Ok(Json(timer.respond(serde_json::json!({ "deleted": true }))))
}

/// POST /api/v1/agents/{id}/clone - Copy an agent for the caller.
pub async fn clone_agent(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Agent>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_agent_id(&id)?;
    let agent = state.agent_service.clone_agent(&id, &identity).await?;
    Ok(Json(agent_response(timer, agent)))
}

/// POST /api/v1/agents/{id}/run - Execute a stored agent for one turn.
pub async fn run_agent(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
    Json(body): Json<AgentRunRequest>,
) -> Result<Json<ApiResponse<ExecutionResult>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_agent_id(&id)?;
    let result = state
        .agent_service
        .run_agent(&id, &body.input, &identity, &state.shutdown)
        .await?;
    Ok(Json(
        timer
            .respond(result)
            .with_link("agent", format!("/api/v1/agents/{id}")),
    ))
}

/// GET /api/v1/agents/{id}/runs - Recent runs, newest first.
pub async fn list_runs(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<String>,
    Query(query): Query<RunListQuery>,
) -> Result<Json<ApiResponse<Vec<AgentRun>>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_agent_id(&id)?;
    let runs = state
        .agent_service
        .list_runs(&id, &identity, query.limit)
        .await?;
    Ok(Json(
        timer
            .respond(runs)
            .with_link("agent", format!("/api/v1/agents/{id}")),
    ))
}

/// POST /api/v1/agents/test - Execute an unsaved configuration for one turn.
pub async fn test_agent(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    Json(body): Json<AgentTestRequest>,
) -> Result<Json<ApiResponse<ExecutionResult>>, AppError> {
    let timer = RequestTimer::start();
    let result = state
        .agent_service
        .test_agent(body.config, &body.input, &identity, &state.shutdown)
        .await?;
    Ok(Json(timer.respond(result)))
}
