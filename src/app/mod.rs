//! Application wiring: configuration, client construction and batch runs.

pub mod config;

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::llm::anthropic::Anthropic;
use crate::adapter::outbound::llm::openai::OpenAi;
use crate::application::batch::{BatchEngine, RateLimitConfig};
use crate::error::Result;
use crate::port::{CompletionClient, UsageSink};

use config::{Config, LlmProvider};

/// Build the upstream client selected by the configuration.
///
/// # Errors
///
/// Returns an error if the provider's API key is not set or the base URL
/// is invalid.
pub fn build_client(config: &Config) -> Result<Arc<dyn CompletionClient>> {
    let client: Arc<dyn CompletionClient> = match config.llm.provider {
        LlmProvider::OpenAi => Arc::new(OpenAi::from_env(
            &config.llm.openai.model,
            &config.llm.openai.base_url,
        )?),
        LlmProvider::Anthropic => Arc::new(Anthropic::from_env(&config.llm.anthropic.model)?),
    };
    info!(
        provider = client.name(),
        model = client.model(),
        "Completion client initialized"
    );
    Ok(client)
}

/// Build an engine from configuration around an existing client.
pub fn build_engine(
    config: &Config,
    client: Arc<dyn CompletionClient>,
    sink: Arc<dyn UsageSink>,
) -> BatchEngine {
    BatchEngine::new(client, sink, config.engine.clone(), config.rate_limit)
}

/// Build an engine with the rate limiter disabled, for trusted jobs.
pub fn build_unlimited_engine(
    config: &Config,
    client: Arc<dyn CompletionClient>,
    sink: Arc<dyn UsageSink>,
) -> BatchEngine {
    let rate_limit = RateLimitConfig {
        enabled: false,
        ..config.rate_limit
    };
    BatchEngine::new(client, sink, config.engine.clone(), rate_limit)
}
