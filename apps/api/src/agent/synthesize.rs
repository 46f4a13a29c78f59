//! Resume synthesis — the final transition of a session.
//!
//! Ordering here is load-bearing: the generated text is written into the
//! state BEFORE any persistence attempt, so a dead disk or unreachable
//! bucket can cost the artifact reference but never the resume itself. Every
//! degradation lands on `completed_with_error` with a non-empty resume.

use chrono::Local;
use tracing::warn;
use uuid::Uuid;

use crate::llm_gateway::{is_fallback, LlmGateway};
use crate::models::session::{InvalidStateError, ProfileInputs, QAPair, SessionState, SessionStep};
use crate::writer::DocumentWriter;

use super::prompts::{profile_context, RESUME_PROMPT_TEMPLATE, RESUME_SYSTEM};
use super::AgentConfig;

pub async fn synthesize_resume(
    mut state: SessionState,
    gateway: &dyn LlmGateway,
    writer: &dyn DocumentWriter,
    config: &AgentConfig,
) -> Result<SessionState, InvalidStateError> {
    state.validate()?;

    let prompt = RESUME_PROMPT_TEMPLATE.replace(
        "{profile_context}",
        &profile_context(&state.inputs, &state.answers),
    );
    let generated = gateway
        .complete(&prompt, Some(RESUME_SYSTEM), config.llm_timeout)
        .await;
    let generated = generated.trim();

    let today = Local::now().format("%Y-%m-%d").to_string();

    if is_fallback(generated) || generated.is_empty() {
        warn!("resume generation unavailable, using deterministic fallback");
        state.resume = fallback_resume(&state.inputs, &state.answers, &today);
        state.artifact_reference = String::new();
        state.step = SessionStep::CompletedWithError;
        return Ok(state);
    }

    // Capture the text first; persistence may still fail.
    state.resume = format!("[Resume Draft]\nGenerated: {today}\n\n{generated}");

    let filename = draft_filename();
    let persisted = tokio::time::timeout(
        config.persist_timeout,
        writer.persist(&state.resume, &filename),
    )
    .await;

    match persisted {
        Ok(Ok(reference)) => {
            state.artifact_reference = reference;
            state.step = SessionStep::Completed;
        }
        Ok(Err(err)) => {
            warn!(error = %err, "resume persistence failed");
            state.artifact_reference = String::new();
            state.step = SessionStep::CompletedWithError;
        }
        Err(_) => {
            warn!(
                timeout_secs = config.persist_timeout.as_secs(),
                "resume persistence timed out"
            );
            state.artifact_reference = String::new();
            state.step = SessionStep::CompletedWithError;
        }
    }

    Ok(state)
}

/// `resume_<timestamp>_<tag>.txt`. The short uuid tag keeps two drafts
/// generated within the same second from overwriting each other.
fn draft_filename() -> String {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let tag = Uuid::new_v4().simple().to_string();
    format!("resume_{stamp}_{}.txt", &tag[..8])
}

/// Deterministic resume built from the profile and recorded answers alone.
/// Mirrors the hand-fillable template the service offers outside the agent
/// flow: basic info, tenure split into years and months, one slot per
/// declared project and certification, then the follow-up answers.
fn fallback_resume(inputs: &ProfileInputs, answers: &[QAPair], today: &str) -> String {
    let years = inputs.work_period / 12;
    let months = inputs.work_period % 12;

    let mut text = String::new();
    text.push_str("# Resume Draft\n");
    text.push_str(&format!("Generated: {today}\n\n"));

    text.push_str("## Basic Information\n");
    text.push_str(&format!("- Email: {}\n", inputs.email));
    text.push_str(&format!("- Preferred job: {}\n", inputs.preferred_job));
    text.push_str(&format!("- Major type: {}\n\n", inputs.major_type.as_str()));

    text.push_str("## Work Experience\n");
    text.push_str(&format!("- Company: {}\n", inputs.company_name));
    text.push_str(&format!("- Position: {}\n", inputs.position));
    text.push_str(&format!("- Total period: {years} years {months} months\n\n"));

    text.push_str("## Projects\n");
    if inputs.project_count == 0 {
        text.push_str("- (none listed)\n");
    }
    for i in 1..=inputs.project_count {
        text.push_str(&format!("- Project {i}: title, period, summary\n"));
    }
    text.push('\n');

    text.push_str("## Certifications\n");
    if inputs.certification_count == 0 {
        text.push_str("- (none listed)\n");
    }
    for i in 1..=inputs.certification_count {
        text.push_str(&format!("- Certification {i}\n"));
    }

    if !inputs.additional_experiences.is_empty() {
        text.push_str("\n## Additional Experiences\n");
        text.push_str(&format!("- {}\n", inputs.additional_experiences));
    }

    if !answers.is_empty() {
        text.push_str("\n## Follow-up Answers\n");
        for pair in answers {
            text.push_str(&format!("- {} → {}\n", pair.question, pair.answer));
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::super::testing::{questioning_state, sample_inputs, HangingWriter, StubGateway, StubWriter};
    use super::super::AgentConfig;
    use super::*;
    use crate::llm_gateway::FALLBACK_COMPLETION;

    const DRAFT: &str = "# Jane Doe\n\n## Experience\n- Built an API";

    fn ready_state() -> SessionState {
        let mut state = questioning_state();
        state.answers.push(QAPair {
            question: "- Q: Which stack did you use?".to_string(),
            answer: "Rust and Postgres".to_string(),
        });
        state.asked_count = 1;
        state.info_ready = true;
        state
    }

    #[tokio::test]
    async fn test_success_completes_with_artifact() {
        let gateway = StubGateway::scripted(&[DRAFT]);
        let writer = StubWriter::ok();

        let state = synthesize_resume(ready_state(), &gateway, &writer, &AgentConfig::default())
            .await
            .unwrap();

        assert_eq!(state.step, SessionStep::Completed);
        assert!(state.resume.starts_with("[Resume Draft]\nGenerated: "));
        assert!(state.resume.contains(DRAFT));
        assert!(!state.artifact_reference.is_empty());

        let (persisted_markup, filename) = writer.last_saved().unwrap();
        assert_eq!(persisted_markup, state.resume);
        assert!(filename.starts_with("resume_"));
        assert!(filename.ends_with(".txt"));
    }

    #[tokio::test]
    async fn test_gateway_fallback_degrades_to_template() {
        let gateway = StubGateway::scripted(&[FALLBACK_COMPLETION]);
        let writer = StubWriter::ok();

        let state = synthesize_resume(ready_state(), &gateway, &writer, &AgentConfig::default())
            .await
            .unwrap();

        assert_eq!(state.step, SessionStep::CompletedWithError);
        assert!(state.artifact_reference.is_empty());
        assert!(state.resume.contains("## Basic Information"));
        assert!(state.resume.contains("1 years 6 months"));
        assert!(state.resume.contains("Rust and Postgres"));
        // Nothing was persisted on the degraded path.
        assert!(writer.last_saved().is_none());
    }

    #[tokio::test]
    async fn test_empty_completion_degrades_to_template() {
        let gateway = StubGateway::scripted(&["   "]);
        let writer = StubWriter::ok();

        let state = synthesize_resume(ready_state(), &gateway, &writer, &AgentConfig::default())
            .await
            .unwrap();

        assert_eq!(state.step, SessionStep::CompletedWithError);
        assert!(state.resume.contains("## Projects"));
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_generated_text() {
        let gateway = StubGateway::scripted(&[DRAFT]);
        let writer = StubWriter::failing();

        let state = synthesize_resume(ready_state(), &gateway, &writer, &AgentConfig::default())
            .await
            .unwrap();

        assert_eq!(state.step, SessionStep::CompletedWithError);
        assert!(state.artifact_reference.is_empty());
        // The LLM text survives even though persistence failed.
        assert!(state.resume.contains(DRAFT));
        assert!(state.validate().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_persist_timeout_degrades() {
        let gateway = StubGateway::scripted(&[DRAFT]);
        let writer = HangingWriter;
        let config = AgentConfig {
            persist_timeout: Duration::from_secs(10),
            ..AgentConfig::default()
        };

        let state = synthesize_resume(ready_state(), &gateway, &writer, &config)
            .await
            .unwrap();

        assert_eq!(state.step, SessionStep::CompletedWithError);
        assert!(state.artifact_reference.is_empty());
        assert!(state.resume.contains(DRAFT));
    }

    #[test]
    fn test_fallback_resume_slots_follow_counts() {
        let mut inputs = sample_inputs();
        inputs.project_count = 2;
        inputs.certification_count = 0;

        let text = fallback_resume(&inputs, &[], "2026-08-25");

        assert!(text.contains("- Project 1:"));
        assert!(text.contains("- Project 2:"));
        assert!(!text.contains("- Project 3:"));
        assert!(text.contains("## Certifications\n- (none listed)"));
        assert!(text.contains("Generated: 2026-08-25"));
    }

    #[test]
    fn test_draft_filename_shape() {
        let name = draft_filename();
        assert!(name.starts_with("resume_"));
        assert!(name.ends_with(".txt"));
        // resume_YYYYMMDD_HHMMSS_xxxxxxxx.txt
        assert_eq!(name.len(), "resume_".len() + 15 + 1 + 8 + ".txt".len());
    }
}
