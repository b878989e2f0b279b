//! Retrying request executor.
//!
//! Runs one document through the upstream client: rate-limit check, a
//! timed call, and exponential backoff on transient failures. Usage is
//! priced and reported only for the attempt that succeeds.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::domain::{pricing, Document, TaskSpec, TokenUsage, UsageRecord};
use crate::error::{Error, Result};
use crate::port::{ChatMessage, Completion, CompletionClient, CompletionRequest, UsageSink};

use super::RateLimiter;

/// Timeout and retry settings for upstream calls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecutorConfig {
    /// Per-attempt timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries after the first attempt; a document sees at most
    /// `max_retries + 1` upstream calls.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Add up to 20% random jitter to each backoff delay.
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

impl ExecutorConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Backoff before retry number `attempt + 1`, without jitter.
    #[must_use]
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            jitter: default_jitter(),
        }
    }
}

const fn default_timeout_secs() -> u64 {
    60
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_backoff_base_ms() -> u64 {
    1_000
}

const fn default_jitter() -> bool {
    true
}

/// Output of a successful execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Completed {
    pub text: String,
    pub usage: TokenUsage,
    pub cost: Decimal,
    /// Upstream calls made, including the successful one.
    pub attempts: u32,
}

/// Executes one document against the upstream client with retries.
pub struct Executor {
    client: Arc<dyn CompletionClient>,
    limiter: Arc<RateLimiter>,
    sink: Arc<dyn UsageSink>,
    config: ExecutorConfig,
}

impl Executor {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        limiter: Arc<RateLimiter>,
        sink: Arc<dyn UsageSink>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            client,
            limiter,
            sink,
            config,
        }
    }

    /// Model identifier used for requests and pricing.
    #[must_use]
    pub fn model(&self) -> &str {
        self.client.model()
    }

    #[must_use]
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Process one document.
    ///
    /// # Errors
    ///
    /// Returns the rate limiter's rejection unchanged, a non-retryable
    /// error as soon as it occurs, or the last retryable error once
    /// `max_retries` is exhausted.
    pub async fn execute(&self, document: &Document, task: &TaskSpec) -> Result<Completed> {
        let request = self.build_request(document, task);
        let mut attempt: u32 = 0;

        loop {
            self.limiter.check()?;

            debug!(
                document = %document.id,
                provider = self.client.name(),
                attempt,
                "Sending completion request"
            );

            match self.attempt(&request).await {
                Ok(completion) => return self.finish(document, completion, attempt + 1),
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.backoff(attempt);
                    warn!(
                        document = %document.id,
                        attempt,
                        delay_ms = delay.as_millis(),
                        error = %err,
                        "Upstream call failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(
                        document = %document.id,
                        attempts = attempt + 1,
                        error = %err,
                        "Upstream call failed permanently"
                    );
                    return Err(err);
                }
            }
        }
    }

    fn build_request(&self, document: &Document, task: &TaskSpec) -> CompletionRequest {
        CompletionRequest {
            model: self.client.model().to_string(),
            messages: vec![
                ChatMessage::system(task.system_prompt()),
                ChatMessage::user(document.content.clone()),
            ],
            temperature: task.temperature,
            max_tokens: task.max_tokens,
        }
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<Completion> {
        let limit = self.config.timeout();
        match timeout(limit, self.client.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(limit)),
        }
    }

    fn finish(&self, document: &Document, completion: Completion, attempts: u32) -> Result<Completed> {
        let text = completion
            .text
            .filter(|text| !text.trim().is_empty())
            .ok_or(Error::EmptyResponse)?;

        let model = self.client.model();
        let cost = pricing::cost_of(model, completion.usage);
        self.sink.record(UsageRecord {
            document_id: document.id.clone(),
            model: model.to_string(),
            usage: completion.usage,
            cost,
        });

        debug!(
            document = %document.id,
            attempts,
            input_tokens = completion.usage.input_tokens,
            output_tokens = completion.usage.output_tokens,
            %cost,
            "Completion succeeded"
        );

        Ok(Completed {
            text,
            usage: completion.usage,
            cost,
            attempts,
        })
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.config.base_delay(attempt);
        if !self.config.jitter {
            return base;
        }
        let jitter_range_ms = u64::try_from(base.as_millis() / 5).unwrap_or(u64::MAX);
        if jitter_range_ms == 0 {
            return base;
        }
        base + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_range_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::batch::RateLimitConfig;
    use crate::port::NoopSink;
    use crate::testkit::llm::{ScriptedClient, Step};
    use crate::testkit::usage::RecordingSink;
    use tokio_test::{assert_err, assert_ok};

    fn executor(client: Arc<ScriptedClient>, sink: Arc<dyn UsageSink>) -> Executor {
        Executor::new(
            client,
            Arc::new(RateLimiter::disabled()),
            sink,
            ExecutorConfig::default(),
        )
    }

    fn doc() -> Document {
        Document::new("a", "a.txt", "The quarterly report shows growth.")
    }

    #[test]
    fn base_delay_doubles() {
        let config = ExecutorConfig::default();
        assert_eq!(config.base_delay(0), Duration::from_secs(1));
        assert_eq!(config.base_delay(1), Duration::from_secs(2));
        assert_eq!(config.base_delay(2), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn builds_system_and_user_messages() {
        let client = Arc::new(ScriptedClient::always_ok("summary", 10, 5));
        let executor = executor(client.clone(), Arc::new(NoopSink));
        let task = TaskSpec::default().with_temperature(0.7).with_max_tokens(256);

        assert_ok!(executor.execute(&doc(), &task).await);

        let request = client.requests().pop().unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.system_prompt(), Some(task.system_prompt()));
        assert_eq!(request.messages[1].content, doc().content);
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.max_tokens, 256);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_with_exponential_backoff() {
        let client = Arc::new(ScriptedClient::new(vec![
            Step::server_error(),
            Step::server_error(),
            Step::ok("done", 100, 50),
        ]));
        let sink = Arc::new(RecordingSink::default());
        let executor = executor(client.clone(), sink.clone());

        let completed = assert_ok!(executor.execute(&doc(), &TaskSpec::default()).await);

        assert_eq!(completed.text, "done");
        assert_eq!(completed.attempts, 3);
        assert_eq!(client.calls(), 3);

        let gaps = client.call_gaps();
        assert_eq!(gaps.len(), 2);
        assert!(gaps[0] >= Duration::from_millis(1_000) && gaps[0] <= Duration::from_millis(1_200));
        assert!(gaps[1] >= Duration::from_millis(2_000) && gaps[1] <= Duration::from_millis(2_400));

        // Cost reported once, for the successful attempt only.
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cost, pricing::cost(client.model(), 100, 50));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let client = Arc::new(ScriptedClient::always(Step::server_error()));
        let sink = Arc::new(RecordingSink::default());
        let executor = executor(client.clone(), sink.clone());

        let err = assert_err!(executor.execute(&doc(), &TaskSpec::default()).await);

        assert!(matches!(err, Error::Upstream { status: 500, .. }));
        assert_eq!(client.calls(), 4);
        assert!(sink.records().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timeouts_are_retried() {
        let client = Arc::new(ScriptedClient::new(vec![Step::Hang, Step::ok("late", 1, 1)]));
        let executor = executor(client.clone(), Arc::new(NoopSink));

        let completed = assert_ok!(executor.execute(&doc(), &TaskSpec::default()).await);

        assert_eq!(completed.text, "late");
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_credentials_are_not_retried() {
        let client = Arc::new(ScriptedClient::always(Step::Fail {
            status: 401,
            message: "invalid api key".into(),
        }));
        let executor = executor(client.clone(), Arc::new(NoopSink));

        let err = assert_err!(executor.execute(&doc(), &TaskSpec::default()).await);

        assert!(matches!(err, Error::Upstream { status: 401, .. }));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_response_is_not_retried_or_billed() {
        let client = Arc::new(ScriptedClient::always(Step::Empty));
        let sink = Arc::new(RecordingSink::default());
        let executor = executor(client.clone(), sink.clone());

        let err = assert_err!(executor.execute(&doc(), &TaskSpec::default()).await);

        assert!(matches!(err, Error::EmptyResponse));
        assert_eq!(client.calls(), 1);
        assert!(sink.records().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_attempt_is_terminal() {
        let client = Arc::new(ScriptedClient::always_ok("ok", 1, 1));
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
            enabled: true,
            per_minute: 1,
            per_day: 100,
        }));
        let executor = Executor::new(
            client.clone(),
            limiter,
            Arc::new(NoopSink),
            ExecutorConfig::default(),
        );

        assert_ok!(executor.execute(&doc(), &TaskSpec::default()).await);
        let err = assert_err!(executor.execute(&doc(), &TaskSpec::default()).await);

        assert!(matches!(err, Error::RateLimited { .. }));
        assert_eq!(client.calls(), 1);
    }
}
