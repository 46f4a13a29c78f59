//! Answer recording — moves the pending question into the answer history.
//!
//! The lookup key is the pending question string itself, exactly as stored.
//! With nothing pending the recorder is an exact no-op, which is what makes
//! the first orchestrator step after `init` safe to call unconditionally.

use std::collections::HashMap;

use tracing::debug;

use crate::models::session::{InvalidStateError, QAPair, SessionState};

/// Sentinel recorded when the caller supplied no answer for the pending
/// question. Distinguishes "asked but unanswered" from "never asked".
pub const NO_RESPONSE: &str = "<no response>";

pub fn record_answer(
    mut state: SessionState,
    user_inputs: &HashMap<String, String>,
) -> Result<SessionState, InvalidStateError> {
    state.validate()?;

    let Some(question) = state.pending_questions.pop() else {
        return Ok(state);
    };

    let answer = match user_inputs.get(&question) {
        Some(answer) => answer.clone(),
        None => {
            debug!(question = %question, "no answer supplied, recording sentinel");
            NO_RESPONSE.to_string()
        }
    };

    state.answers.push(QAPair { question, answer });
    state.asked_count += 1;
    Ok(state)
}
