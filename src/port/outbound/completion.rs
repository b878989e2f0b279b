//! Completion port for upstream language-model calls.
//!
//! Defines the one operation the engine needs from a provider: send a
//! role-tagged message list, get back text plus token usage or an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::TokenUsage;
use crate::error::Result;

/// Role of a message in a chat request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// One role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A provider-neutral completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// The first system message, if any.
    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }
}

/// A successful upstream response.
///
/// `text` is `None` when the provider answered without any content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Completion {
    pub text: Option<String>,
    pub usage: TokenUsage,
}

/// Client for an upstream completion service.
///
/// Implementations wrap specific providers (OpenAI-compatible, Anthropic)
/// and handle authentication and response parsing. Timeouts, retries and
/// rate limiting are the engine's job, not the client's.
///
/// # Errors
///
/// [`complete`](Self::complete) maps transport failures to
/// [`Error::Transport`](crate::error::Error::Transport) or
/// [`Error::Http`](crate::error::Error::Http), non-success statuses to
/// [`Error::Upstream`](crate::error::Error::Upstream), and an undecodable
/// success body to [`Error::Json`](crate::error::Error::Json).
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Return the provider name for logging.
    fn name(&self) -> &'static str;

    /// Model identifier requests should carry.
    fn model(&self) -> &str;

    /// Send one completion request.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_finds_first_system_message() {
        let request = CompletionRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("text")],
            temperature: 0.2,
            max_tokens: 64,
        };
        assert_eq!(request.system_prompt(), Some("be brief"));
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(Role::System.as_str(), "system");
    }
}
