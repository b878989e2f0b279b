//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file. Every section is optional and
//! falls back to defaults; API keys come from the environment only.
//!
//! ```toml
//! [llm]
//! provider = "openai"
//! openai = { model = "gpt-4o-mini" }
//!
//! [engine]
//! timeout_secs = 60
//! max_retries = 3
//!
//! [rate_limit]
//! per_minute = 60
//! per_day = 10000
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::application::batch::{ExecutorConfig, RateLimitConfig};
use crate::domain::MAX_TEMPERATURE;
use crate::error::{ConfigError, Result};

mod defaults;
mod llm;
mod logging;

pub use defaults::BatchDefaults;
pub use llm::{AnthropicConfig, LlmConfig, LlmProvider, OpenAiConfig};
pub use logging::LoggingConfig;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Upstream provider configuration.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Timeout and retry settings.
    #[serde(default)]
    pub engine: ExecutorConfig,
    /// Request ceilings.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Task parameters used when a request omits them.
    #[serde(default)]
    pub defaults: BatchDefaults,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Read, parse and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails validation.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse(&content)
    }

    /// Parse and validate config text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or fails validation.
    #[allow(clippy::result_large_err)]
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.llm.model().trim().is_empty() {
            return Err(ConfigError::MissingField { field: "llm.model" }.into());
        }
        if self.llm.provider == LlmProvider::OpenAi {
            Url::parse(&self.llm.openai.base_url).map_err(|e| ConfigError::InvalidValue {
                field: "llm.openai.base_url",
                reason: e.to_string(),
            })?;
        }
        if self.engine.timeout_secs == 0 {
            return Err(invalid("engine.timeout_secs", "must be positive"));
        }
        if self.rate_limit.enabled && self.rate_limit.per_minute == 0 {
            return Err(invalid("rate_limit.per_minute", "must be positive"));
        }
        if self.rate_limit.enabled && self.rate_limit.per_day < self.rate_limit.per_minute {
            return Err(invalid(
                "rate_limit.per_day",
                "must be at least rate_limit.per_minute",
            ));
        }
        if !(0.0..=MAX_TEMPERATURE).contains(&self.defaults.temperature) {
            return Err(invalid("defaults.temperature", "must be between 0 and 2"));
        }
        if self.defaults.max_tokens == 0 {
            return Err(invalid("defaults.max_tokens", "must be positive"));
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskCategory;
    use crate::error::Error;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.llm.provider, LlmProvider::OpenAi);
        assert_eq!(config.llm.model(), "gpt-4o-mini");
        assert_eq!(config.engine, ExecutorConfig::default());
        assert_eq!(config.rate_limit, RateLimitConfig::default());
        assert_eq!(config.defaults.task, TaskCategory::Summarize);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parses_all_sections() {
        let config = Config::parse(
            r#"
            [llm]
            provider = "anthropic"
            anthropic = { model = "claude-3-5-sonnet-20241022" }

            [engine]
            timeout_secs = 30
            max_retries = 5
            backoff_base_ms = 500
            jitter = false

            [rate_limit]
            enabled = false
            per_minute = 10
            per_day = 100

            [defaults]
            task = "analyze"
            concurrency = 8

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.provider, LlmProvider::Anthropic);
        assert_eq!(config.llm.model(), "claude-3-5-sonnet-20241022");
        assert_eq!(config.engine.timeout_secs, 30);
        assert_eq!(config.engine.max_retries, 5);
        assert!(!config.engine.jitter);
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.defaults.task, TaskCategory::Analyze);
        assert_eq!(config.defaults.concurrency, 8);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = Config::parse("[engine]\ntimeout_secs = 0").unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "engine.timeout_secs",
                ..
            })
        ));
    }

    #[test]
    fn rejects_bad_base_url() {
        let err = Config::parse("[llm.openai]\nbase_url = \"not a url\"").unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "llm.openai.base_url",
                ..
            })
        ));
    }

    #[test]
    fn rejects_day_ceiling_below_minute_ceiling() {
        let err = Config::parse("[rate_limit]\nper_minute = 100\nper_day = 10").unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "rate_limit.per_day",
                ..
            })
        ));
    }

    #[test]
    fn rejects_invalid_toml() {
        assert!(matches!(
            Config::parse("[engine\n"),
            Err(Error::Config(ConfigError::Parse(_)))
        ));
    }
}
