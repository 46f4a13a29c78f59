//! Axum route handler for the profile extraction flow.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::extract::{extract_facts, ResumeFacts};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub resume_text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub message: String,
    pub data: ResumeFacts,
}

// ────────────────────────────────────────────────────────────────────────────
// Handler
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resume/extract
///
/// Extracts profile facts from pasted resume text. Never fails outright:
/// on any extraction error the response carries `extraction_failed` plus a
/// blank default profile the client lets the user fill in by hand.
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Json<ExtractResponse> {
    info!(chars = request.resume_text.len(), "extraction requested");

    match extract_facts(
        &request.resume_text,
        state.gateway.as_ref(),
        state.config.llm_timeout,
    )
    .await
    {
        Ok(facts) => Json(ExtractResponse {
            message: "extraction_success".to_string(),
            data: facts,
        }),
        Err(err) => {
            error!(error = %err, "extraction failed, returning default facts");
            Json(ExtractResponse {
                message: "extraction_failed".to_string(),
                data: ResumeFacts::default_facts(),
            })
        }
    }
}
