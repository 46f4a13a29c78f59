use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_gateway::openai::DEFAULT_OPENAI_MODEL;
use crate::llm_gateway::vllm::{DEFAULT_VLLM_BASE_URL, DEFAULT_VLLM_MODEL};

/// Which completion backend serves the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAi,
    Vllm,
}

/// Where finished documents are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Local,
    S3,
}

/// Application configuration loaded from environment variables.
/// Startup fails if a variable required by the selected backend or storage
/// mode is missing; variables the selection makes irrelevant are ignored.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_backend: LlmBackend,
    /// Required when `llm_backend` is OpenAi; empty otherwise.
    pub openai_api_key: String,
    pub vllm_url: String,
    pub llm_model: String,
    pub storage_mode: StorageMode,
    pub output_dir: String,
    /// Required when `storage_mode` is S3; empty otherwise.
    pub s3_bucket: String,
    /// Custom endpoint for S3-compatible stores (MinIO). None means AWS.
    pub s3_endpoint: Option<String>,
    pub s3_key_prefix: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub max_questions: u32,
    pub llm_timeout: Duration,
    pub persist_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_backend = match std::env::var("LLM_BACKEND")
            .unwrap_or_else(|_| "openai".to_string())
            .to_lowercase()
            .as_str()
        {
            "openai" => LlmBackend::OpenAi,
            "vllm" => LlmBackend::Vllm,
            other => bail!("LLM_BACKEND must be 'openai' or 'vllm', got {other:?}"),
        };

        let storage_mode = match std::env::var("STORAGE_MODE")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "local" => StorageMode::Local,
            "s3" => StorageMode::S3,
            other => bail!("STORAGE_MODE must be 'local' or 's3', got {other:?}"),
        };

        let openai_api_key = match llm_backend {
            LlmBackend::OpenAi => require_env("OPENAI_API_KEY")?,
            LlmBackend::Vllm => std::env::var("OPENAI_API_KEY").unwrap_or_default(),
        };

        let llm_model = std::env::var("LLM_MODEL").unwrap_or_else(|_| {
            match llm_backend {
                LlmBackend::OpenAi => DEFAULT_OPENAI_MODEL,
                LlmBackend::Vllm => DEFAULT_VLLM_MODEL,
            }
            .to_string()
        });

        let (s3_bucket, aws_access_key_id, aws_secret_access_key) = match storage_mode {
            StorageMode::S3 => (
                require_env("S3_BUCKET")?,
                require_env("AWS_ACCESS_KEY_ID")?,
                require_env("AWS_SECRET_ACCESS_KEY")?,
            ),
            StorageMode::Local => (String::new(), String::new(), String::new()),
        };

        Ok(Config {
            llm_backend,
            openai_api_key,
            vllm_url: std::env::var("VLLM_URL")
                .unwrap_or_else(|_| DEFAULT_VLLM_BASE_URL.to_string()),
            llm_model,
            storage_mode,
            output_dir: std::env::var("OUTPUT_DIR")
                .unwrap_or_else(|_| "./generated_resumes".to_string()),
            s3_bucket,
            s3_endpoint: std::env::var("S3_ENDPOINT").ok(),
            s3_key_prefix: std::env::var("S3_KEY_PREFIX").unwrap_or_else(|_| "resume".to_string()),
            aws_access_key_id,
            aws_secret_access_key,
            max_questions: std::env::var("MAX_QUESTIONS")
                .unwrap_or_else(|_| "3".to_string())
                .parse::<u32>()
                .context("MAX_QUESTIONS must be a non-negative integer")?,
            llm_timeout: Duration::from_secs(
                std::env::var("LLM_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "45".to_string())
                    .parse::<u64>()
                    .context("LLM_TIMEOUT_SECS must be a number of seconds")?,
            ),
            persist_timeout: Duration::from_secs(
                std::env::var("PERSIST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse::<u64>()
                    .context("PERSIST_TIMEOUT_SECS must be a number of seconds")?,
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
