/// Hosted OpenAI-compatible backend (bearer-token auth).
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::{complete_chat, ChatRequest, LlmGateway, FALLBACK_COMPLETION};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

pub struct OpenAiGateway {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiGateway {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_OPENAI_BASE_URL.to_string())
    }

    /// Points the adapter at any OpenAI-compatible host. Used by tests and
    /// by proxy deployments.
    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        OpenAiGateway {
            client: Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        timeout: Duration,
    ) -> String {
        let request = ChatRequest::new(&self.model, system_prompt, prompt);
        match complete_chat(
            &self.client,
            &self.endpoint(),
            Some(&self.api_key),
            request,
            timeout,
        )
        .await
        {
            Ok(text) => {
                debug!(model = %self.model, chars = text.len(), "openai completion succeeded");
                text
            }
            Err(err) => {
                warn!(model = %self.model, error = %err, "openai completion failed, using fallback");
                FALLBACK_COMPLETION.to_string()
            }
        }
    }
}
