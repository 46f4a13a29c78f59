/// LLM Gateway — the single point of entry for all model calls in this
/// service.
///
/// ARCHITECTURAL RULE: no other module may talk to a model API directly.
/// Every component depends on the `LlmGateway` trait and receives an adapter
/// by injection; there are no module-level client singletons.
///
/// The gateway is deliberately infallible: `complete` always returns a
/// string, and every transport, API, timeout, or decode problem collapses
/// into [`FALLBACK_COMPLETION`]. Callers decide what degradation means for
/// them — the question generator reads the fallback as "stop asking", the
/// resume synthesizer switches to its deterministic template.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub mod openai;
pub mod vllm;

pub use openai::OpenAiGateway;
pub use vllm::VllmGateway;

/// Token budget for a single completion. Sized for one question or one
/// resume draft, not long-form generation.
const MAX_COMPLETION_TOKENS: u32 = 1024;
const TEMPERATURE: f32 = 0.3;
/// One retry for transient transport failures, then give up.
const MAX_ATTEMPTS: u32 = 2;
const RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Fixed string substituted for the model output whenever a call fails.
/// Never produced by a healthy backend; components test for it with
/// [`is_fallback`] instead of string-matching ad hoc.
pub const FALLBACK_COMPLETION: &str = "[completion unavailable]";

/// True when a completion is the gateway's failure substitute rather than
/// model output.
pub fn is_fallback(completion: &str) -> bool {
    completion == FALLBACK_COMPLETION
}

/// Uniform interface over completion backends. Implementations apply the
/// caller's timeout, retry transient transport errors once, and never
/// return an error.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        timeout: Duration,
    ) -> String;
}

/// Internal gateway error. Converted to [`FALLBACK_COMPLETION`] inside the
/// adapters; it never crosses the trait boundary.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("completion response carried no content")]
    EmptyContent,

    #[error("completion timed out after {0:?}")]
    Timeout(Duration),
}

impl LlmError {
    /// Worth one retry: connection-level failures and 429/5xx statuses.
    /// A response that arrived but could not be decoded is not transient —
    /// resending the same prompt will not fix a shape mismatch.
    fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(err) => !err.is_decode(),
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::EmptyContent | LlmError::Timeout(_) => false,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAI-compatible chat wire format (shared by both adapters)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl<'a> ChatRequest<'a> {
    pub(crate) fn new(model: &'a str, system_prompt: Option<&'a str>, prompt: &'a str) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });
        ChatRequest {
            model,
            messages,
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl ChatResponse {
    fn text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Shared request plumbing
// ────────────────────────────────────────────────────────────────────────────

/// Runs the attempt loop under one overall deadline. The timeout is the
/// caller's whole budget for this completion, not a per-attempt bound.
pub(crate) async fn complete_chat(
    client: &Client,
    url: &str,
    bearer_token: Option<&str>,
    request: ChatRequest<'_>,
    timeout: Duration,
) -> Result<String, LlmError> {
    match tokio::time::timeout(timeout, attempt_loop(client, url, bearer_token, &request)).await {
        Ok(result) => result,
        Err(_) => Err(LlmError::Timeout(timeout)),
    }
}

async fn attempt_loop(
    client: &Client,
    url: &str,
    bearer_token: Option<&str>,
    request: &ChatRequest<'_>,
) -> Result<String, LlmError> {
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..MAX_ATTEMPTS {
        if attempt > 0 {
            warn!(
                attempt,
                delay_ms = RETRY_DELAY.as_millis() as u64,
                "completion attempt failed, retrying"
            );
            tokio::time::sleep(RETRY_DELAY).await;
        }

        match send_once(client, url, bearer_token, request).await {
            Ok(text) => return Ok(text),
            Err(err) if err.is_transient() => last_error = Some(err),
            Err(err) => return Err(err),
        }
    }

    Err(last_error.unwrap_or(LlmError::EmptyContent))
}

async fn send_once(
    client: &Client,
    url: &str,
    bearer_token: Option<&str>,
    request: &ChatRequest<'_>,
) -> Result<String, LlmError> {
    let mut builder = client
        .post(url)
        .header("content-type", "application/json")
        .json(request);
    if let Some(token) = bearer_token {
        builder = builder.bearer_auth(token);
    }

    let response = builder.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        return Err(LlmError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let completion: ChatResponse = response.json().await?;
    let text = completion.text().ok_or(LlmError::EmptyContent)?;
    Ok(text.trim().to_string())
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub(crate) fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
