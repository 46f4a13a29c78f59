mod agent;
mod config;
mod errors;
mod extract;
mod llm_gateway;
mod models;
mod render;
mod routes;
mod state;
mod writer;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::agent::{AgentConfig, ResumeAgent};
use crate::config::{Config, LlmBackend, StorageMode};
use crate::llm_gateway::{LlmGateway, OpenAiGateway, VllmGateway};
use crate::routes::build_router;
use crate::state::AppState;
use crate::writer::{DocumentWriter, LocalDocumentWriter, S3DocumentWriter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume agent API v{}", env!("CARGO_PKG_VERSION"));

    // Select the LLM gateway backend
    let gateway: Arc<dyn LlmGateway> = match config.llm_backend {
        LlmBackend::OpenAi => Arc::new(OpenAiGateway::new(
            config.openai_api_key.clone(),
            config.llm_model.clone(),
        )),
        LlmBackend::Vllm => Arc::new(VllmGateway::new(
            config.vllm_url.clone(),
            config.llm_model.clone(),
        )),
    };
    info!("LLM gateway initialized (model: {})", config.llm_model);

    // Select the document writer
    let writer: Arc<dyn DocumentWriter> = match config.storage_mode {
        StorageMode::Local => {
            info!("Persisting documents under {}", config.output_dir);
            Arc::new(LocalDocumentWriter::new(config.output_dir.clone()))
        }
        StorageMode::S3 => {
            let s3 = build_s3_client(&config).await;
            info!("S3 client initialized (bucket: {})", config.s3_bucket);
            Arc::new(S3DocumentWriter::new(
                s3,
                config.s3_bucket.clone(),
                config.s3_key_prefix.clone(),
            ))
        }
    };

    // Assemble the agent
    let agent = ResumeAgent::new(
        gateway.clone(),
        writer,
        AgentConfig {
            max_questions: config.max_questions,
            llm_timeout: config.llm_timeout,
            persist_timeout: config.persist_timeout,
        },
    );

    // Build app state
    let state = AppState {
        agent,
        gateway,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client for AWS or any S3-compatible endpoint (MinIO).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "resume-agent-static",
    );

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials);
    if let Some(endpoint) = &config.s3_endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    let s3_config = loader.load().await;

    aws_sdk_s3::Client::new(&s3_config)
}
