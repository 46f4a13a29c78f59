use std::sync::Arc;

use crate::agent::ResumeAgent;
use crate::config::Config;
use crate::llm_gateway::LlmGateway;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The session state machine driving the interactive agent API.
    pub agent: ResumeAgent,
    /// Direct gateway access for the extraction flow, which runs outside
    /// the agent. Same instance the agent holds.
    pub gateway: Arc<dyn LlmGateway>,
    pub config: Config,
}
