/// Self-hosted vLLM backend. Same chat-completions wire format as the
/// hosted adapter, no auth header.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::{complete_chat, ChatRequest, LlmGateway, FALLBACK_COMPLETION};

pub const DEFAULT_VLLM_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_VLLM_MODEL: &str = "CohereLabs/aya-expanse-8b";

pub struct VllmGateway {
    client: Client,
    model: String,
    base_url: String,
}

impl VllmGateway {
    pub fn new(base_url: String, model: String) -> Self {
        VllmGateway {
            client: Client::new(),
            model,
            base_url,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmGateway for VllmGateway {
    async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        timeout: Duration,
    ) -> String {
        let request = ChatRequest::new(&self.model, system_prompt, prompt);
        match complete_chat(&self.client, &self.endpoint(), None, request, timeout).await {
            Ok(text) => {
                debug!(model = %self.model, chars = text.len(), "vllm completion succeeded");
                text
            }
            Err(err) => {
                warn!(model = %self.model, error = %err, "vllm completion failed, using fallback");
                FALLBACK_COMPLETION.to_string()
            }
        }
    }
}
