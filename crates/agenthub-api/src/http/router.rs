//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Agents
        .route("/agents", post(handlers::agent::create_agent))
        .route("/agents/test", post(handlers::agent::test_agent))
        .route(
            "/agents/{id}",
            get(handlers::agent::get_agent)
                .put(handlers::agent::update_agent)
                .delete(handlers::agent::delete_agent),
        )
        .route("/agents/{id}/clone", post(handlers::agent::clone_agent))
        .route("/agents/{id}/run", post(handlers::agent::run_agent))
        .route("/agents/{id}/runs", get(handlers::agent::list_runs))
        // Library
        .route("/prompts", post(handlers::library::create_prompt))
        .route(
            "/prompts/{id}",
            get(handlers::library::get_prompt)
                .put(handlers::library::update_prompt)
                .delete(handlers::library::delete_prompt),
        )
        .route("/tools", post(handlers::library::create_tool))
        .route(
            "/tools/{id}",
            get(handlers::library::get_tool)
                .put(handlers::library::update_tool)
                .delete(handlers::library::delete_tool),
        )
        // Tool-runner assistant
        .route(
            "/tools/generate-instructions",
            post(handlers::assist::generate_tool_instructions),
        )
        .route("/tools/{id}/run", post(handlers::assist::run_tool))
        .route(
            "/tools/{id}/instructions",
            post(handlers::assist::tool_instructions),
        )
        .route(
            "/ai/generate-installation-steps",
            post(handlers::assist::generate_installation_steps),
        )
        .route(
            "/ai/generate-agent-instructions",
            post(handlers::assist::generate_agent_instructions),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
