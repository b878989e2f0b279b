use std::time::Duration;

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Request-shape violations detected before a batch reaches the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("batch contains no documents")]
    Empty,

    #[error("batch contains {count} documents, maximum is {max}")]
    TooManyDocuments { count: usize, max: usize },

    #[error("duplicate document id '{id}'")]
    DuplicateId { id: String },

    #[error("unsupported task category '{0}'")]
    UnsupportedTask(String),
}

/// Which rolling window rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateWindow {
    Minute,
    Day,
}

impl std::fmt::Display for RateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minute => write!(f, "per-minute"),
            Self::Day => write!(f, "per-day"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("{window} rate limit reached{}", retry_hint(.retry_after))]
    RateLimited {
        window: RateWindow,
        retry_after: Option<Duration>,
    },

    #[error("upstream request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("upstream returned no text")]
    EmptyResponse,

    #[error("invalid task: {0}")]
    InvalidTask(String),

    #[error("batch cancelled before document was started")]
    Cancelled,

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

fn retry_hint(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(wait) => format!(", retry in {}s", wait.as_secs().max(1)),
        None => String::new(),
    }
}

impl Error {
    /// Whether another attempt at the same upstream call may succeed.
    ///
    /// Rate-limit rejections are terminal for the attempt: the limiter's
    /// window is process-local and retrying inside the backoff loop would
    /// only burn the retry budget.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Transport(_) | Self::Http(_) => true,
            Self::Upstream { status, .. } => !matches!(status, 401 | 403),
            _ => false,
        }
    }
}
