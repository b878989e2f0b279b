//! OpenAI-compatible chat completions client.
//!
//! Provides an implementation of [`CompletionClient`] for the OpenAI Chat
//! Completions API and any service exposing the same wire format behind a
//! different base URL.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::TokenUsage;
use crate::error::{ConfigError, Error, Result};
use crate::port::{Completion, CompletionClient, CompletionRequest};

use super::{success_body, transport_error, upstream_error};

/// Default API base.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";

/// Environment variable holding the bearer token.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// OpenAI API client.
#[derive(Debug)]
pub struct OpenAi {
    /// HTTP client for API requests.
    client: Client,
    /// Bearer token.
    api_key: String,
    /// Model identifier (e.g., "gpt-4o-mini").
    model: String,
    /// Full chat completions endpoint.
    endpoint: Url,
}

impl OpenAi {
    /// Create a new client against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid absolute URL.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: &str,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            endpoint: endpoint(base_url)?,
        })
    }

    /// Create a client from the `OPENAI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set or the base
    /// URL is invalid.
    pub fn from_env(model: impl Into<String>, base_url: &str) -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| Error::Config(ConfigError::MissingField { field: API_KEY_VAR }))?;
        Self::new(api_key, model, base_url)
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Resolve `chat/completions` against a base URL, tolerating a missing
/// trailing slash.
fn endpoint(base_url: &str) -> Result<Url> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join("chat/completions")?)
}

#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
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
            temperature: request.temperature,
            messages: request
                .messages
                .iter()
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
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl From<Response> for Completion {
    fn from(response: Response) -> Self {
        let usage = response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();
        Self {
            text: response
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content),
            usage,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAi {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::ChatMessage;

    fn sample_request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![
                ChatMessage::system("Summarize."),
                ChatMessage::user(r#"Quarterly "numbers" and {"json": true}"#),
            ],
            temperature: 0.3,
            max_tokens: 512,
        }
    }

    // ==================== Request/Response Serialization Tests ====================

    #[test]
    fn test_request_serialization() {
        let request = sample_request();
        let json = serde_json::to_value(Request::from(&request)).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 512);
        assert_eq!(json["temperature"], 0.3);
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(
            json["messages"][1]["content"],
            r#"Quarterly "numbers" and {"json": true}"#
        );
    }

    #[test]
    fn test_response_with_usage() {
        let json = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1677652288,
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "A short summary."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 100, "completion_tokens": 50, "total_tokens": 150}
        }"#;

        let completion: Completion = serde_json::from_str::<Response>(json).unwrap().into();
        assert_eq!(completion.text.as_deref(), Some("A short summary."));
        assert_eq!(completion.usage, TokenUsage::new(100, 50));
    }

    #[test]
    fn test_response_empty_choices_has_no_text() {
        let json = r#"{"choices": [], "usage": {"prompt_tokens": 10, "completion_tokens": 0}}"#;
        let completion: Completion = serde_json::from_str::<Response>(json).unwrap().into();
        assert!(completion.text.is_none());
        assert_eq!(completion.usage.input_tokens, 10);
    }

    #[test]
    fn test_response_null_content_and_missing_usage() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let completion: Completion = serde_json::from_str::<Response>(json).unwrap().into();
        assert!(completion.text.is_none());
        assert_eq!(completion.usage, TokenUsage::default());
    }

    // ==================== Client Construction Tests ====================

    #[test]
    fn test_endpoint_resolution() {
        assert_eq!(
            endpoint(DEFAULT_BASE_URL).unwrap().as_str(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            endpoint("http://localhost:8080/v1").unwrap().as_str(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            OpenAi::new("key", "gpt-4o", "not a url"),
            Err(Error::Url(_))
        ));
    }

    #[test]
    fn test_client_name_and_model() {
        let client = OpenAi::new("key", "gpt-4o", DEFAULT_BASE_URL).unwrap();
        assert_eq!(client.name(), "openai");
        assert_eq!(client.model(), "gpt-4o");
    }
}

/// Integration tests that require real API access.
/// Run with: `cargo test --features integration-tests -- --ignored`
#[cfg(all(test, feature = "integration-tests"))]
mod integration_tests {
    use super::*;
    use crate::port::ChatMessage;

    #[tokio::test]
    #[ignore = "requires OPENAI_API_KEY and network access"]
    async fn test_simple_completion() {
        let client = match OpenAi::from_env("gpt-4o-mini", DEFAULT_BASE_URL) {
            Ok(client) => client,
            Err(e) => {
                eprintln!("Skipping OpenAI integration test: {}", e);
                return;
            }
        };

        let request = CompletionRequest {
            model: client.model().to_string(),
            messages: vec![
                ChatMessage::system("Answer with one word."),
                ChatMessage::user("Say hello."),
            ],
            temperature: 0.0,
            max_tokens: 16,
        };

        let completion = client.complete(&request).await.expect("API call failed");
        assert!(completion.text.is_some());
        assert!(completion.usage.input_tokens > 0);
    }
}
