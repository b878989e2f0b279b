//! Upstream completion adapters.
//!
//! Provides implementations of the
//! [`CompletionClient`](crate::port::CompletionClient) trait for an
//! OpenAI-compatible chat completions endpoint and the Anthropic
//! Messages API.

pub mod anthropic;
pub mod openai;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Structured error payload shared by both providers:
/// `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Convert a non-success response into [`Error::Upstream`].
///
/// Uses the structured error message when the body carries one, the raw
/// body otherwise.
async fn upstream_error(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Error::Upstream {
        status,
        message: error_message(&body),
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => "no response body".into(),
        Err(_) => body.trim().chars().take(500).collect(),
    }
}

/// Read and decode a success body.
///
/// A failed read is a transport error; a body that does not decode is
/// [`Error::Json`], which is never retried.
async fn success_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let body = response.bytes().await.map_err(transport_error)?;
    decode(&body)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(body)?)
}

/// Map a send failure to a retryable transport error.
fn transport_error(err: reqwest::Error) -> Error {
    Error::Transport(err.to_string())
}
