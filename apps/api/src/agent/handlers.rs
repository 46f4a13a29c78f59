//! Axum route handlers for the interactive agent API.
//!
//! The server keeps no session store: the full state travels to the client
//! in every response and comes back flattened into the next update request.

use std::collections::HashMap;

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::session::{ProfileInputs, SessionState};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types (responses are the bare SessionState)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AgentInitRequest {
    pub inputs: ProfileInputs,
}

/// Update payload: the round-tripped session state at the top level, plus
/// the caller's answers keyed by the raw pending question string.
#[derive(Debug, Deserialize)]
pub struct AgentUpdateRequest {
    #[serde(flatten)]
    pub state: SessionState,
    #[serde(default)]
    pub user_inputs: HashMap<String, String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resume/agent/init
///
/// Starts a session: validates the profile, asks the first question (or
/// marks the session ready), and returns the state for the client to hold.
pub async fn handle_agent_init(
    State(state): State<AppState>,
    Json(request): Json<AgentInitRequest>,
) -> Result<Json<SessionState>, AppError> {
    info!(preferred_job = %request.inputs.preferred_job, "agent session init");

    let session = state.agent.init(request.inputs).await?;
    Ok(Json(session))
}

/// POST /api/v1/resume/agent/update
///
/// Advances a round-tripped session by one step. Terminal sessions come
/// back unchanged, so clients may retry the call safely.
pub async fn handle_agent_update(
    State(state): State<AppState>,
    Json(request): Json<AgentUpdateRequest>,
) -> Result<Json<SessionState>, AppError> {
    info!(
        step = request.state.step.as_str(),
        asked = request.state.asked_count,
        "agent session update"
    );

    let session = state.agent.step(request.state, &request.user_inputs).await?;
    Ok(Json(session))
}
