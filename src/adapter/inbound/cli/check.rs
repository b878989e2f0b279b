//! Diagnostic checks.

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::llm::{anthropic, openai};
use crate::app::config::{Config, LlmProvider};
use crate::error::Result;

/// Validate configuration and report the effective settings.
pub fn execute_config(config: &Config, source: &str) -> Result<()> {
    let key_var = match config.llm.provider {
        LlmProvider::OpenAi => openai::API_KEY_VAR,
        LlmProvider::Anthropic => anthropic::API_KEY_VAR,
    };
    let key_present = std::env::var(key_var).is_ok_and(|v| !v.trim().is_empty());

    if output::is_json() {
        output::json_output(json!({
            "command": "check.config",
            "source": source,
            "valid": true,
            "model": config.llm.model(),
            "timeout_secs": config.engine.timeout_secs,
            "max_retries": config.engine.max_retries,
            "rate_limit": {
                "enabled": config.rate_limit.enabled,
                "per_minute": config.rate_limit.per_minute,
                "per_day": config.rate_limit.per_day,
            },
            "api_key_present": key_present,
        }));
        return Ok(());
    }

    output::section("Configuration Check");
    output::field("Config", source);
    output::success("Configuration is valid");

    output::section("Summary");
    output::field("Provider", format!("{:?}", config.llm.provider));
    output::field("Model", config.llm.model());
    output::field("Timeout", format!("{}s", config.engine.timeout_secs));
    output::field("Retries", config.engine.max_retries);
    if config.rate_limit.enabled {
        output::field(
            "Rate limit",
            format!(
                "{}/min, {}/day",
                config.rate_limit.per_minute, config.rate_limit.per_day
            ),
        );
    } else {
        output::field("Rate limit", "disabled");
    }

    if key_present {
        output::success(&format!("{key_var} detected"));
    } else {
        output::warning(&format!("{key_var} not set (required for `docbatch run`)"));
    }

    Ok(())
}
