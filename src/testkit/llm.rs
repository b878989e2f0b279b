//! Scripted [`CompletionClient`] for testing.
//!
//! Each call pops the next [`Step`] from the script; once the script is
//! exhausted the last step repeats. Steps can also be pinned to a document
//! content string so one document fails while its siblings succeed.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::domain::TokenUsage;
use crate::error::{Error, Result};
use crate::port::{Completion, CompletionClient, CompletionRequest, Role};

/// One scripted upstream behaviour.
#[derive(Debug, Clone)]
pub enum Step {
    /// Succeed with text and usage.
    Ok {
        text: String,
        input_tokens: u64,
        output_tokens: u64,
    },
    /// Succeed at the transport level with no text.
    Empty,
    /// Non-success upstream status.
    Fail { status: u16, message: String },
    /// Network failure.
    Transport,
    /// Never answer; exercises the executor timeout.
    Hang,
}

impl Step {
    pub fn ok(text: impl Into<String>, input_tokens: u64, output_tokens: u64) -> Self {
        Self::Ok {
            text: text.into(),
            input_tokens,
            output_tokens,
        }
    }

    pub fn server_error() -> Self {
        Self::Fail {
            status: 500,
            message: "internal server error".into(),
        }
    }
}

/// Mock client with call accounting.
pub struct ScriptedClient {
    model: String,
    script: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    by_content: HashMap<String, Step>,
    latency: Duration,
    calls: AtomicUsize,
    live: AtomicUsize,
    peak: AtomicUsize,
    call_times: Mutex<Vec<Instant>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            model: "gpt-4o-mini".into(),
            script: Mutex::new(steps.into()),
            last: Mutex::new(None),
            by_content: HashMap::new(),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
            live: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            call_times: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Repeat one step forever.
    pub fn always(step: Step) -> Self {
        Self::new(vec![step])
    }

    pub fn always_ok(text: &str, input_tokens: u64, output_tokens: u64) -> Self {
        Self::always(Step::ok(text, input_tokens, output_tokens))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Simulated upstream latency applied before every answer.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Always answer `step` for requests whose user message equals `content`.
    pub fn on_content(mut self, content: impl Into<String>, step: Step) -> Self {
        self.by_content.insert(content.into(), step);
        self
    }

    /// Total upstream calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were outstanding at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Time between consecutive calls.
    pub fn call_gaps(&self) -> Vec<Duration> {
        self.call_times
            .lock()
            .windows(2)
            .map(|w| w[1].duration_since(w[0]))
            .collect()
    }

    /// Calls whose user message equals `content`.
    pub fn calls_for(&self, content: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| user_content(r) == Some(content))
            .count()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    fn next_step(&self, request: &CompletionRequest) -> Step {
        if let Some(step) = user_content(request).and_then(|c| self.by_content.get(c)) {
            return step.clone();
        }
        let mut last = self.last.lock();
        match self.script.lock().pop_front() {
            Some(step) => {
                *last = Some(step.clone());
                step
            }
            None => last.clone().unwrap_or_else(|| Step::ok("ok", 1, 1)),
        }
    }
}

fn user_content(request: &CompletionRequest) -> Option<&str> {
    request
        .messages
        .iter()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
}

struct LiveGuard<'a>(&'a AtomicUsize);

impl Drop for LiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_times.lock().push(Instant::now());
        self.requests.lock().push(request.clone());

        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(live, Ordering::SeqCst);
        // Decrements on every exit path, including timeout cancellation.
        let _guard = LiveGuard(&self.live);

        let step = self.next_step(request);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match step {
            Step::Ok {
                text,
                input_tokens,
                output_tokens,
            } => Ok(Completion {
                text: Some(text),
                usage: TokenUsage::new(input_tokens, output_tokens),
            }),
            Step::Empty => Ok(Completion {
                text: None,
                usage: TokenUsage::new(10, 0),
            }),
            Step::Fail { status, message } => Err(Error::Upstream { status, message }),
            Step::Transport => Err(Error::Transport("connection reset by peer".into())),
            Step::Hang => std::future::pending().await,
        }
    }
}
