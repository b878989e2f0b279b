//! Anthropic Messages API client.
//!
//! Provides an implementation of [`CompletionClient`] for the Anthropic
//! Messages API. System messages are lifted into the top-level `system`
//! field the API expects.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::TokenUsage;
use crate::error::{ConfigError, Error, Result};
use crate::port::{Completion, CompletionClient, CompletionRequest, Role};

use super::{success_body, transport_error, upstream_error};

/// Anthropic Messages API endpoint.
const API_URL: &str = "https://api.anthropic.com/v1/messages";

/// API version header value.
const API_VERSION: &str = "2023-06-01";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Anthropic Claude API client.
#[derive(Debug)]
pub struct Anthropic {
    /// HTTP client for API requests.
    client: Client,
    /// API key for authentication.
    api_key: String,
    /// Model identifier (e.g., "claude-3-5-sonnet-20241022").
    model: String,
}

impl Anthropic {
    /// Create a new Anthropic client with explicit configuration.
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Create a client from the `ANTHROPIC_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| Error::Config(ConfigError::MissingField { field: API_KEY_VAR }))?;
        Ok(Self::new(api_key, model))
    }
}

#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a CompletionRequest> for Request<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            max_tokens: request.max_tokens,
            // The Messages API caps temperature at 1.0.
            temperature: request.temperature.min(1.0),
            system: request.system_prompt(),
            messages: request
                .messages
                .iter()
                .filter(|m| m.role != Role::System)
                .map(|m| Message {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct Response {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

impl From<Response> for Completion {
    fn from(response: Response) -> Self {
        let text: String = response
            .content
            .into_iter()
            .filter_map(|c| c.text)
            .collect();
        Self {
            text: (!text.is_empty()).then_some(text),
            usage: response
                .usage
                .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens))
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl CompletionClient for Anthropic {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&Request::from(request))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        Ok(success_body::<Response>(response).await?.into())
    }
}
