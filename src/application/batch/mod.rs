//! Batch completion engine.
//!
//! Four pieces, leaves first:
//!
//! - [`pricing`](crate::domain::pricing) - cost model (domain, pure)
//! - [`RateLimiter`] - rolling per-minute and per-day ceilings
//! - [`Executor`] - one document, timeout plus exponential-backoff retry
//! - [`Scheduler`] - many documents, bounded concurrency, failure isolation
//!
//! [`BatchEngine`] wires them together and is what callers hold.

mod cancel;
mod executor;
mod limiter;
mod request;
mod scheduler;

use std::sync::Arc;

pub use cancel::CancelSignal;
pub use executor::{Completed, Executor, ExecutorConfig};
pub use limiter::{RateLimitConfig, RateLimitSnapshot, RateLimiter};
pub use request::{BatchRequest, ValidatedBatch, MAX_DOCUMENTS};
pub use scheduler::Scheduler;

use crate::domain::{BatchReport, Document, TaskSpec};
use crate::error::Result;
use crate::port::{CompletionClient, UsageSink};

/// Entry point for submitting batches.
///
/// Owns its rate limiter; share one limiter across engines with
/// [`BatchEngine::with_limiter`] to enforce a per-tenant ceiling.
pub struct BatchEngine {
    scheduler: Scheduler,
}

impl BatchEngine {
    /// Build an engine with its own rate limiter.
    pub fn new(
        client: Arc<dyn CompletionClient>,
        sink: Arc<dyn UsageSink>,
        executor: ExecutorConfig,
        rate_limit: RateLimitConfig,
    ) -> Self {
        Self::with_limiter(client, sink, executor, Arc::new(RateLimiter::new(rate_limit)))
    }

    /// Build an engine around an existing, possibly shared, limiter.
    pub fn with_limiter(
        client: Arc<dyn CompletionClient>,
        sink: Arc<dyn UsageSink>,
        executor: ExecutorConfig,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        let executor = Executor::new(client, limiter, sink, executor);
        Self {
            scheduler: Scheduler::new(Arc::new(executor)),
        }
    }

    #[must_use]
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        self.scheduler.executor().limiter()
    }

    /// Validate a caller's request, then process it.
    ///
    /// # Errors
    ///
    /// Returns a request-shape error before any document is processed.
    pub async fn submit(&self, request: BatchRequest) -> Result<BatchReport> {
        self.submit_with_cancel(request, &CancelSignal::new()).await
    }

    /// [`submit`](Self::submit) with a cancellation signal.
    ///
    /// # Errors
    ///
    /// Same as [`submit`](Self::submit).
    pub async fn submit_with_cancel(
        &self,
        request: BatchRequest,
        cancel: &CancelSignal,
    ) -> Result<BatchReport> {
        let batch = request.validate()?;
        self.scheduler
            .process_batch_with_cancel(&batch.documents, &batch.task, cancel)
            .await
    }

    /// Process already-validated documents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTask`](crate::error::Error::InvalidTask) for
    /// a malformed task.
    pub async fn process_batch(&self, documents: &[Document], task: &TaskSpec) -> Result<BatchReport> {
        self.scheduler.process_batch(documents, task).await
    }
}
