pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::agent::handlers as agent_handlers;
use crate::extract::handlers as extract_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interactive agent API
        .route(
            "/api/v1/resume/agent/init",
            post(agent_handlers::handle_agent_init),
        )
        .route(
            "/api/v1/resume/agent/update",
            post(agent_handlers::handle_agent_update),
        )
        // Profile extraction
        .route(
            "/api/v1/resume/extract",
            post(extract_handlers::handle_extract),
        )
        .with_state(state)
}
