//! Completion evaluation — the pure predicate deciding whether questioning
//! has run its course.

use crate::models::session::{InvalidStateError, SessionState};

use super::AgentConfig;

/// Sets `info_ready` once nothing is pending and the question budget is
/// spent; otherwise returns the state untouched. `info_ready` only ever
/// latches on, the generator's own signal is never undone here.
pub fn evaluate_completion(
    mut state: SessionState,
    config: &AgentConfig,
) -> Result<SessionState, InvalidStateError> {
    state.validate()?;

    if state.pending_questions.is_empty() && state.asked_count >= config.max_questions {
        state.info_ready = true;
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::super::testing::questioning_state;
    use super::*;
    use crate::models::session::QAPair;

    fn state_with_answers(count: u32) -> SessionState {
        let mut state = questioning_state();
        for i in 0..count {
            state.answers.push(QAPair {
                question: format!("- Q: question {i}?"),
                answer: "answered".to_string(),
            });
        }
        state.asked_count = count;
        state
    }

    #[test]
    fn test_budget_spent_sets_info_ready() {
        let state = evaluate_completion(state_with_answers(3), &AgentConfig::default()).unwrap();
        assert!(state.info_ready);
    }

    #[test]
    fn test_below_budget_leaves_state_unchanged() {
        let before = state_with_answers(2);
        let after = evaluate_completion(before.clone(), &AgentConfig::default()).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn test_pending_question_blocks_completion() {
        let mut state = state_with_answers(3);
        state.pending_questions = vec!["- Q: one more?".to_string()];

        let state = evaluate_completion(state, &AgentConfig::default()).unwrap();

        assert!(!state.info_ready);
    }

    #[test]
    fn test_info_ready_stays_latched() {
        let mut state = state_with_answers(1);
        state.info_ready = true;

        let state = evaluate_completion(state, &AgentConfig::default()).unwrap();

        assert!(state.info_ready);
    }

    #[test]
    fn test_invalid_state_fails_fast() {
        let mut state = questioning_state();
        state.asked_count = 7;
        assert!(evaluate_completion(state, &AgentConfig::default()).is_err());
    }
}
