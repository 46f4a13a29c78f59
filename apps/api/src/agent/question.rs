//! Question generation — decides whether another follow-up question is worth
//! asking and, if so, produces exactly one.
//!
//! The hard cap is checked before any model call: once `asked_count` reaches
//! the configured maximum the session is marked ready without spending a
//! completion. Below the cap, the model either emits one `- Q: ...` line or
//! signals it is done; the raw trimmed line is stored as-is, because the same
//! string later keys the answer lookup.

use tracing::debug;

use crate::llm_gateway::{is_fallback, LlmGateway};
use crate::models::session::{InvalidStateError, SessionState};

use super::prompts::{profile_context, QUESTION_PROMPT_TEMPLATE, QUESTION_SYSTEM};
use super::AgentConfig;

/// Runs one generation pass. Never fails after entry validation: a fallback
/// or malformed completion reads as "no further question".
pub async fn generate_question(
    mut state: SessionState,
    gateway: &dyn LlmGateway,
    config: &AgentConfig,
) -> Result<SessionState, InvalidStateError> {
    state.validate()?;

    if state.asked_count >= config.max_questions {
        debug!(
            asked = state.asked_count,
            max = config.max_questions,
            "question cap reached, skipping model call"
        );
        state.info_ready = true;
        state.pending_questions.clear();
        return Ok(state);
    }

    let prompt = QUESTION_PROMPT_TEMPLATE.replace(
        "{profile_context}",
        &profile_context(&state.inputs, &state.answers),
    );
    let response = gateway
        .complete(&prompt, Some(QUESTION_SYSTEM), config.llm_timeout)
        .await;
    let question = response.trim().to_string();

    if signals_no_question(&question) {
        debug!("model signaled no further question");
        state.info_ready = true;
        state.pending_questions.clear();
    } else {
        debug!(question = %question, "generated follow-up question");
        state.pending_questions = vec![question];
    }

    Ok(state)
}

/// A gateway fallback, an empty completion, or any response carrying the
/// NONE token (case/whitespace-insensitive) ends questioning.
fn signals_no_question(question: &str) -> bool {
    if is_fallback(question) {
        return true;
    }
    let normalized = question.to_uppercase();
    normalized.is_empty() || normalized.contains("NONE")
}
