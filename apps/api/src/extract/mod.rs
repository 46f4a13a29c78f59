//! Profile extraction — pulls the structured facts the agent needs out of
//! pasted resume text.
//!
//! This flow sits beside the agent, not inside it: callers use it to
//! pre-fill `ProfileInputs` before starting a session. Unlike the agent's
//! free-text completions the model must return structured JSON here, so
//! parse failures get their own bounded retry, separate from the transport
//! retry the gateway already performs.

pub mod handlers;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::llm_gateway::{is_fallback, strip_json_fences, LlmGateway};
use crate::models::session::MajorType;

/// Attempts at getting parseable JSON out of the model. Transport problems
/// are not retried here; the gateway owns those.
pub const MAX_PARSE_ATTEMPTS: u32 = 2;
/// Resume text beyond this many characters is cut off before prompting.
const MAX_INPUT_CHARS: usize = 3500;

pub const EXTRACT_SYSTEM: &str = "You analyze a developer's resume text. \
    Extract ONLY the following fields and respond with a single JSON object, nothing else:\n\
    - certification_count: number of certifications or licenses\n\
    - project_count: number of projects, assignments, or implementations\n\
    - major_type: \"MAJOR\" if the field of study is computer/software/AI/IT related, otherwise \"NON_MAJOR\"\n\
    - company_name: most recent company name, or null if no work history\n\
    - work_period: months at the most recent company, or 0 if none\n\
    - position: role at the most recent company, or null\n\
    - additional_experiences: other notable experience, or null\n\
    Rules: never include any other field. Use null or 0 when uncertain. \
    Output the JSON object only, no explanations, no markdown fences.";

/// Facts the model extracts from resume text. Counts and major type are
/// required; a completion missing them is a parse failure and consumes a
/// retry. The work-history fields are genuinely optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeFacts {
    pub certification_count: u32,
    pub project_count: u32,
    pub major_type: MajorType,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub work_period: Option<u32>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub additional_experiences: Option<String>,
}

impl ResumeFacts {
    /// The body returned when extraction fails: a blank profile the user
    /// fills in by hand.
    pub fn default_facts() -> Self {
        ResumeFacts {
            certification_count: 0,
            project_count: 0,
            major_type: MajorType::NonMajor,
            company_name: None,
            work_period: Some(0),
            position: None,
            additional_experiences: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("resume text is empty")]
    EmptyInput,

    #[error("language model unavailable")]
    Unavailable,

    #[error("no parseable facts after {0} attempts")]
    ParseExhausted(u32),
}

/// Runs the bounded extraction loop. A gateway fallback aborts immediately,
/// an unparseable completion is retried with the identical prompt.
pub async fn extract_facts(
    resume_text: &str,
    gateway: &dyn LlmGateway,
    timeout: Duration,
) -> Result<ResumeFacts, ExtractError> {
    let trimmed = resume_text.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::EmptyInput);
    }
    let input = truncate_chars(trimmed, MAX_INPUT_CHARS);

    for attempt in 1..=MAX_PARSE_ATTEMPTS {
        let completion = gateway.complete(input, Some(EXTRACT_SYSTEM), timeout).await;
        if is_fallback(&completion) {
            return Err(ExtractError::Unavailable);
        }

        match parse_facts(&completion) {
            Ok(facts) => return Ok(facts),
            Err(err) => warn!(attempt, error = %err, "facts did not parse"),
        }
    }

    Err(ExtractError::ParseExhausted(MAX_PARSE_ATTEMPTS))
}

fn parse_facts(completion: &str) -> anyhow::Result<ResumeFacts> {
    let stripped = strip_json_fences(completion);
    let json = locate_json(stripped)
        .ok_or_else(|| anyhow::anyhow!("no JSON object in completion"))?;
    Ok(serde_json::from_str(json)?)
}

/// First `{` through the first `}` after it. The facts schema is flat, so
/// the non-greedy match never cuts a nested object short.
fn locate_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text[start..].find('}')? + start;
    Some(&text[start..=end])
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::StubGateway;
    use crate::llm_gateway::FALLBACK_COMPLETION;

    const GOOD_JSON: &str = r#"{
        "certification_count": 2,
        "project_count": 3,
        "major_type": "MAJOR",
        "company_name": "Acme Corp",
        "work_period": 18,
        "position": "Backend Developer",
        "additional_experiences": "Hackathons"
    }"#;

    fn timeout() -> Duration {
        Duration::from_secs(45)
    }

    #[tokio::test]
    async fn test_clean_json_parses_first_attempt() {
        let gateway = StubGateway::scripted(&[GOOD_JSON]);

        let facts = extract_facts("resume text", &gateway, timeout())
            .await
            .unwrap();

        assert_eq!(facts.certification_count, 2);
        assert_eq!(facts.major_type, MajorType::Major);
        assert_eq!(facts.company_name.as_deref(), Some("Acme Corp"));
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fenced_and_chattered_json_still_parses() {
        let wrapped = format!("Sure! Here are the facts:\n```json\n{GOOD_JSON}\n```");
        let gateway = StubGateway::scripted(&[&wrapped]);

        let facts = extract_facts("resume text", &gateway, timeout())
            .await
            .unwrap();

        assert_eq!(facts.project_count, 3);
    }

    #[tokio::test]
    async fn test_parse_failure_retries_once_then_succeeds() {
        let gateway = StubGateway::scripted(&["this is not json", GOOD_JSON]);

        let facts = extract_facts("resume text", &gateway, timeout())
            .await
            .unwrap();

        assert_eq!(facts.work_period, Some(18));
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_parse_exhaustion_after_two_attempts() {
        let gateway = StubGateway::always("still not json");

        let result = extract_facts("resume text", &gateway, timeout()).await;

        assert!(matches!(result, Err(ExtractError::ParseExhausted(2))));
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_required_count_consumes_a_retry() {
        // major_type and counts are required; nullable fields are not.
        let incomplete = r#"{"certification_count": null, "project_count": 1, "major_type": "MAJOR"}"#;
        let gateway = StubGateway::scripted(&[incomplete, GOOD_JSON]);

        let facts = extract_facts("resume text", &gateway, timeout())
            .await
            .unwrap();

        assert_eq!(facts.certification_count, 2);
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_gateway_fallback_aborts_without_retry() {
        let gateway = StubGateway::scripted(&[FALLBACK_COMPLETION, GOOD_JSON]);

        let result = extract_facts("resume text", &gateway, timeout()).await;

        assert!(matches!(result, Err(ExtractError::Unavailable)));
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_input_rejected_before_any_call() {
        let gateway = StubGateway::scripted(&[GOOD_JSON]);

        let result = extract_facts("   \n  ", &gateway, timeout()).await;

        assert!(matches!(result, Err(ExtractError::EmptyInput)));
        assert_eq!(gateway.call_count(), 0);
    }

    #[test]
    fn test_locate_json_finds_object_inside_chatter() {
        assert_eq!(locate_json("before {\"a\": 1} after"), Some("{\"a\": 1}"));
        assert_eq!(locate_json("no braces here"), None);
        assert_eq!(locate_json("only open {"), None);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "한글과 english mixed text";
        let cut = truncate_chars(text, 3);
        assert_eq!(cut, "한글과");
        assert_eq!(truncate_chars("short", 3500), "short");
    }

    #[test]
    fn test_optional_fields_may_be_null_or_absent() {
        let minimal = r#"{"certification_count": 0, "project_count": 1, "major_type": "NON_MAJOR", "company_name": null}"#;
        let facts: ResumeFacts = serde_json::from_str(minimal).unwrap();
        assert_eq!(facts.company_name, None);
        assert_eq!(facts.work_period, None);
    }
}
