//! Session state model — the canonical representation of one resume-building
//! session, threaded through every agent component as a pure value.
//!
//! Validation is centralized here: `ProfileInputs::validate` and
//! `SessionState::validate` are the only places the structural invariants are
//! checked, and every component calls them on entry instead of re-deriving
//! its own assumptions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a state fails validation. Surfaced to HTTP callers as a
/// client error — a malformed round-tripped state is the caller's fault.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid state: {0}")]
pub struct InvalidStateError(pub String);

/// Whether the user studied a software-related field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MajorType {
    Major,
    NonMajor,
}

impl MajorType {
    /// Wire name, reused verbatim in prompt context blocks.
    pub fn as_str(&self) -> &'static str {
        match self {
            MajorType::Major => "MAJOR",
            MajorType::NonMajor => "NON_MAJOR",
        }
    }
}

/// Immutable base facts supplied at session start. Never mutated afterwards;
/// counts are unsigned so negative values cannot even deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInputs {
    pub email: String,
    pub preferred_job: String,
    pub certification_count: u32,
    pub project_count: u32,
    pub major_type: MajorType,
    pub company_name: String,
    pub position: String,
    /// Tenure at the most recent company, in months.
    pub work_period: u32,
    pub additional_experiences: String,
}

impl ProfileInputs {
    /// The email must contain an `@` with a `.` somewhere after it. Anything
    /// beyond that is left to the upstream account system.
    pub fn validate(&self) -> Result<(), InvalidStateError> {
        let valid = match self.email.find('@') {
            Some(at) => self.email[at + 1..].contains('.'),
            None => false,
        };
        if valid {
            Ok(())
        } else {
            Err(InvalidStateError(format!(
                "malformed email address: {:?}",
                self.email
            )))
        }
    }
}

/// One recorded question/answer exchange. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QAPair {
    pub question: String,
    pub answer: String,
}

/// Where the session currently sits. Progression is strictly forward:
/// `Questioning` may move to any terminal variant, terminal variants never
/// change again.
///
/// Serialized names double as the wire markers the client sees
/// (`"questioning"`, `"completed"`, `"error_in_resume_synthesizer"`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStep {
    #[default]
    Questioning,
    Completed,
    CompletedWithError,
    ErrorInQuestionGenerator,
    ErrorInAnswerRecorder,
    ErrorInCompletionEvaluator,
    ErrorInResumeSynthesizer,
}

impl SessionStep {
    /// Every step except `Questioning` is terminal: further agent calls
    /// return the state unchanged.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStep::Questioning)
    }

    /// Stable name matching the serialized form, for log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStep::Questioning => "questioning",
            SessionStep::Completed => "completed",
            SessionStep::CompletedWithError => "completed_with_error",
            SessionStep::ErrorInQuestionGenerator => "error_in_question_generator",
            SessionStep::ErrorInAnswerRecorder => "error_in_answer_recorder",
            SessionStep::ErrorInCompletionEvaluator => "error_in_completion_evaluator",
            SessionStep::ErrorInResumeSynthesizer => "error_in_resume_synthesizer",
        }
    }
}

/// The aggregate passed between agent components. Flat JSON on the wire —
/// the client round-trips the whole object between calls, so field names are
/// part of the API.
///
/// Ownership transfers forward: each component consumes the previous state
/// and returns a new one, so a caller that wants replay/debug history just
/// keeps its own snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub inputs: ProfileInputs,
    /// At most one outstanding question at a time. The stored string is the
    /// raw trimmed LLM line (`- Q: ...` prefix included) and is also the key
    /// the answer lookup is matched against — same string end-to-end.
    #[serde(default)]
    pub pending_questions: Vec<String>,
    /// Append-only history of recorded exchanges.
    #[serde(default)]
    pub answers: Vec<QAPair>,
    /// Incremented exactly once per recorded answer; always equals
    /// `answers.len()`.
    #[serde(default)]
    pub asked_count: u32,
    /// Latches true when questioning is finished; never reset within a
    /// session.
    #[serde(default)]
    pub info_ready: bool,
    /// Final resume text. Empty until synthesis; non-empty on every
    /// `completed*` step, even when persistence failed.
    #[serde(default)]
    pub resume: String,
    /// Path or URL of the persisted document; empty when persistence was
    /// skipped or failed.
    #[serde(default)]
    pub artifact_reference: String,
    #[serde(default)]
    pub step: SessionStep,
}

impl SessionState {
    /// Fresh state at session initialization: no questions asked, nothing
    /// generated.
    pub fn new(inputs: ProfileInputs) -> Self {
        SessionState {
            inputs,
            pending_questions: Vec::new(),
            answers: Vec::new(),
            asked_count: 0,
            info_ready: false,
            resume: String::new(),
            artifact_reference: String::new(),
            step: SessionStep::Questioning,
        }
    }

    /// Checks the structural invariants that the type system cannot express.
    /// Components fail fast on a state that violates any of these.
    pub fn validate(&self) -> Result<(), InvalidStateError> {
        self.inputs.validate()?;

        if self.pending_questions.len() > 1 {
            return Err(InvalidStateError(format!(
                "{} pending questions; at most one may be outstanding",
                self.pending_questions.len()
            )));
        }
        if self.asked_count as usize != self.answers.len() {
            return Err(InvalidStateError(format!(
                "asked_count {} does not match {} recorded answers",
                self.asked_count,
                self.answers.len()
            )));
        }
        if matches!(
            self.step,
            SessionStep::Completed | SessionStep::CompletedWithError
        ) && self.resume.is_empty()
        {
            return Err(InvalidStateError(format!(
                "step {} with an empty resume",
                self.step.as_str()
            )));
        }
        Ok(())
    }
}
