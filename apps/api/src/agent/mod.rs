//! Agent orchestrator — drives one resume session through its components.
//!
//! Control flow is an explicit match/branch pipeline, not a graph engine:
//! `step` runs Answer Recorder, then Completion Evaluator, then branches on
//! `info_ready` into either the Resume Synthesizer or another Question
//! Generator pass. Every component call crosses the `settle` boundary, which
//! absorbs unexpected failures into an `error_in_<component>` step marker
//! stamped onto the last valid state — recorded answers are never lost to a
//! component bug.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use crate::llm_gateway::LlmGateway;
use crate::models::session::{InvalidStateError, ProfileInputs, SessionState, SessionStep};
use crate::writer::DocumentWriter;

pub mod answer;
pub mod completion;
pub mod handlers;
pub mod prompts;
pub mod question;
pub mod synthesize;

pub use answer::NO_RESPONSE;

/// Tunables for one agent instance. Defaults match the production
/// deployment; tests shrink the timeouts.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Hard cap on follow-up questions per session.
    pub max_questions: u32,
    /// Budget for one LLM completion, retries included.
    pub llm_timeout: Duration,
    /// Budget for persisting the finished document.
    pub persist_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            max_questions: 3,
            llm_timeout: Duration::from_secs(45),
            persist_timeout: Duration::from_secs(10),
        }
    }
}

/// Supplies answers for the headless driver. The question handed in is the
/// raw pending string, the same key the interactive API uses.
pub trait AnswerSource {
    fn answer_for(&self, question: &str) -> Option<String>;
}

impl AnswerSource for HashMap<String, String> {
    fn answer_for(&self, question: &str) -> Option<String> {
        self.get(question).cloned()
    }
}

/// The session state machine. Cheap to clone; both collaborators arrive by
/// injection so tests swap in stubs.
#[derive(Clone)]
pub struct ResumeAgent {
    gateway: Arc<dyn LlmGateway>,
    writer: Arc<dyn DocumentWriter>,
    config: AgentConfig,
}

impl ResumeAgent {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        writer: Arc<dyn DocumentWriter>,
        config: AgentConfig,
    ) -> Self {
        ResumeAgent {
            gateway,
            writer,
            config,
        }
    }

    /// Starts a session: validates the inputs, then runs one Question
    /// Generator pass so the caller immediately has either a pending
    /// question or `info_ready`.
    pub async fn init(&self, inputs: ProfileInputs) -> Result<SessionState, InvalidStateError> {
        inputs.validate()?;
        let state = SessionState::new(inputs);

        let snapshot = state.clone();
        let result = question::generate_question(state, self.gateway.as_ref(), &self.config).await;
        Ok(settle(SessionStep::ErrorInQuestionGenerator, snapshot, result))
    }

    /// Advances the session by one round. Terminal states pass through
    /// untouched, so clients may re-send a finished session safely.
    pub async fn step(
        &self,
        state: SessionState,
        user_inputs: &HashMap<String, String>,
    ) -> Result<SessionState, InvalidStateError> {
        state.validate()?;

        if state.step.is_terminal() {
            debug!(step = state.step.as_str(), "session already terminal");
            return Ok(state);
        }

        let snapshot = state.clone();
        let result = answer::record_answer(state, user_inputs);
        let state = settle(SessionStep::ErrorInAnswerRecorder, snapshot, result);
        if state.step.is_terminal() {
            return Ok(state);
        }

        let snapshot = state.clone();
        let result = completion::evaluate_completion(state, &self.config);
        let state = settle(SessionStep::ErrorInCompletionEvaluator, snapshot, result);
        if state.step.is_terminal() {
            return Ok(state);
        }

        if state.info_ready {
            let snapshot = state.clone();
            let result = synthesize::synthesize_resume(
                state,
                self.gateway.as_ref(),
                self.writer.as_ref(),
                &self.config,
            )
            .await;
            Ok(settle(SessionStep::ErrorInResumeSynthesizer, snapshot, result))
        } else {
            let snapshot = state.clone();
            let result =
                question::generate_question(state, self.gateway.as_ref(), &self.config).await;
            Ok(settle(SessionStep::ErrorInQuestionGenerator, snapshot, result))
        }
    }

    /// Headless driver: loops `step` until the session is terminal, pulling
    /// answers from the given source. A question the source cannot answer is
    /// recorded with the `<no response>` sentinel like any other miss.
    pub async fn run_to_completion(
        &self,
        inputs: ProfileInputs,
        answers: &dyn AnswerSource,
    ) -> Result<SessionState, InvalidStateError> {
        let mut state = self.init(inputs).await?;

        while !state.step.is_terminal() {
            let mut user_inputs = HashMap::new();
            if let Some(question) = state.pending_questions.first() {
                if let Some(answer) = answers.answer_for(question) {
                    user_inputs.insert(question.clone(), answer);
                }
            }
            state = self.step(state, &user_inputs).await?;
        }

        Ok(state)
    }
}

/// The component error boundary. A component that errors, or hands back a
/// state that fails validation, is absorbed here: the failure is logged and
/// the marker step is stamped onto the pre-call snapshot.
fn settle(
    marker: SessionStep,
    snapshot: SessionState,
    result: Result<SessionState, InvalidStateError>,
) -> SessionState {
    let failure = match result {
        Ok(next) => match next.validate() {
            Ok(()) => return next,
            Err(err) => err,
        },
        Err(err) => err,
    };

    error!(
        marker = marker.as_str(),
        error = %failure,
        "component failed, stamping error marker on last valid state"
    );
    let mut state = snapshot;
    state.step = marker;
    state
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::llm_gateway::{LlmGateway, FALLBACK_COMPLETION};
    use crate::models::session::{MajorType, ProfileInputs, SessionState};
    use crate::writer::{DocumentWriter, PersistError};

    pub(crate) fn sample_inputs() -> ProfileInputs {
        ProfileInputs {
            email: "dev@example.com".to_string(),
            preferred_job: "Backend Engineer".to_string(),
            certification_count: 2,
            project_count: 3,
            major_type: MajorType::Major,
            company_name: "Acme Corp".to_string(),
            position: "Junior Developer".to_string(),
            work_period: 18,
            additional_experiences: "Open-source contributions".to_string(),
        }
    }

    pub(crate) fn questioning_state() -> SessionState {
        SessionState::new(sample_inputs())
    }

    /// Gateway that replays a fixed script, then keeps returning the
    /// fallback string (or, via `always`, one response forever).
    pub(crate) struct StubGateway {
        script: Mutex<VecDeque<String>>,
        exhausted: String,
        calls: AtomicUsize,
    }

    impl StubGateway {
        pub(crate) fn scripted(responses: &[&str]) -> Self {
            StubGateway {
                script: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
                exhausted: FALLBACK_COMPLETION.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn always(response: &str) -> Self {
            StubGateway {
                script: Mutex::new(VecDeque::new()),
                exhausted: response.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmGateway for StubGateway {
        async fn complete(
            &self,
            _prompt: &str,
            _system_prompt: Option<&str>,
            _timeout: Duration,
        ) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| self.exhausted.clone())
        }
    }

    /// Writer that records what it was asked to persist, or refuses.
    pub(crate) struct StubWriter {
        fail: bool,
        saved: Mutex<Vec<(String, String)>>,
    }

    impl StubWriter {
        pub(crate) fn ok() -> Self {
            StubWriter {
                fail: false,
                saved: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing() -> Self {
            StubWriter {
                fail: true,
                saved: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn last_saved(&self) -> Option<(String, String)> {
            self.saved.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl DocumentWriter for StubWriter {
        async fn persist(
            &self,
            markup_text: &str,
            suggested_filename: &str,
        ) -> Result<String, PersistError> {
            if self.fail {
                return Err(PersistError::Upload("stub writer refused".to_string()));
            }
            self.saved.lock().unwrap().push((
                markup_text.to_string(),
                suggested_filename.to_string(),
            ));
            Ok(format!("/tmp/resumes/{suggested_filename}"))
        }
    }

    /// Writer that never finishes. Pair with paused tokio time.
    pub(crate) struct HangingWriter;

    #[async_trait]
    impl DocumentWriter for HangingWriter {
        async fn persist(
            &self,
            _markup_text: &str,
            _suggested_filename: &str,
        ) -> Result<String, PersistError> {
            tokio::time::sleep(Duration::from_secs(86400)).await;
            Err(PersistError::Upload("unreachable".to_string()))
        }
    }
}
