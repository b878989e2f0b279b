//! Upstream provider configuration.
//!
//! API keys are never read from the config file; they come from
//! `OPENAI_API_KEY` or `ANTHROPIC_API_KEY` at runtime.

use serde::Deserialize;

use crate::adapter::outbound::llm::openai::DEFAULT_BASE_URL;

/// LLM configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmConfig {
    /// Which provider to use.
    #[serde(default)]
    pub provider: LlmProvider,
    /// OpenAI-compatible settings.
    #[serde(default)]
    pub openai: OpenAiConfig,
    /// Anthropic-specific settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,
}

impl LlmConfig {
    /// Model identifier of the active provider.
    #[must_use]
    pub fn model(&self) -> &str {
        match self.provider {
            LlmProvider::OpenAi => &self.openai.model,
            LlmProvider::Anthropic => &self.anthropic.model,
        }
    }
}

/// LLM provider selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI or any service speaking its chat completions format.
    #[default]
    OpenAi,
    /// Anthropic Claude models.
    Anthropic,
}

/// OpenAI-compatible configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// Model identifier.
    #[serde(default = "default_openai_model")]
    pub model: String,
    /// API base URL; override for compatible gateways.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: default_openai_model(),
            base_url: default_base_url(),
        }
    }
}

/// Anthropic-specific configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicConfig {
    /// Model identifier.
    #[serde(default = "default_anthropic_model")]
    pub model: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: default_anthropic_model(),
        }
    }
}

fn default_openai_model() -> String {
    "gpt-4o-mini".into()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-20241022".into()
}
