//! Bounded-concurrency batch scheduler.
//!
//! Blank documents are skipped up front. The rest are started in queue
//! order, at most `effective_concurrency` at a time; whenever one settles
//! its result is recorded and the next queued document starts.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::{BatchId, BatchReport, Document, ProcessingResult, TaskSpec};
use crate::error::{Error, Result};

use super::{CancelSignal, Executor};

/// Drives a batch of documents through an [`Executor`].
pub struct Scheduler {
    executor: Arc<Executor>,
}

impl Scheduler {
    pub fn new(executor: Arc<Executor>) -> Self {
        Self { executor }
    }

    #[must_use]
    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    /// Process every document, returning exactly one result per document.
    ///
    /// Completion order is not preserved; sort the report by id if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTask`] for a malformed task. Per-document
    /// failures never escape; they become `failed` results.
    pub async fn process_batch(&self, documents: &[Document], task: &TaskSpec) -> Result<BatchReport> {
        self.process_batch_with_cancel(documents, task, &CancelSignal::new())
            .await
    }

    /// [`process_batch`](Self::process_batch) with a cancellation signal.
    ///
    /// # Errors
    ///
    /// Same as [`process_batch`](Self::process_batch).
    pub async fn process_batch_with_cancel(
        &self,
        documents: &[Document],
        task: &TaskSpec,
        cancel: &CancelSignal,
    ) -> Result<BatchReport> {
        task.validate()?;

        let batch_id = BatchId::new();
        let started_at = Utc::now();
        let clock = Instant::now();
        let limit = task.effective_concurrency();

        let mut results = Vec::with_capacity(documents.len());
        let mut pending = VecDeque::with_capacity(documents.len());
        for document in documents {
            if document.is_blank() {
                debug!(document = %document.id, "Skipping blank document");
                results.push(ProcessingResult::skipped(document));
            } else {
                pending.push_back(document);
            }
        }

        info!(
            batch = %batch_id,
            documents = documents.len(),
            queued = pending.len(),
            concurrency = limit,
            task = %task.category,
            "Starting batch"
        );

        let mut in_flight = FuturesUnordered::new();
        loop {
            while in_flight.len() < limit {
                let Some(document) = pending.pop_front() else {
                    break;
                };
                if cancel.is_cancelled() {
                    results.push(ProcessingResult::failed(
                        document,
                        Error::Cancelled.to_string(),
                        Duration::ZERO,
                    ));
                    continue;
                }
                in_flight.push(self.run_one(document, task));
            }

            match in_flight.next().await {
                Some(result) => results.push(result),
                None => break,
            }
        }

        let report = BatchReport::new(
            batch_id,
            started_at,
            self.executor.model(),
            results,
            clock.elapsed(),
        );

        info!(
            batch = %report.batch_id,
            successful = report.summary.successful,
            failed = report.summary.failed,
            skipped = report.summary.skipped,
            cost = %report.total_cost,
            elapsed_ms = report.elapsed.as_millis(),
            "Batch complete"
        );

        Ok(report)
    }

    async fn run_one(&self, document: &Document, task: &TaskSpec) -> ProcessingResult {
        let started = Instant::now();
        match self.executor.execute(document, task).await {
            Ok(done) => ProcessingResult::success(
                document,
                done.text,
                done.usage,
                done.cost,
                started.elapsed(),
            ),
            Err(err) => {
                warn!(document = %document.id, error = %err, "Document failed");
                ProcessingResult::failed(document, err.to_string(), started.elapsed())
            }
        }
    }
}
