//! Per-document results and the batch report.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use super::{BatchId, Document, DocumentId, TokenUsage};

/// Terminal state of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Failed,
    Skipped,
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Outcome of processing one document.
///
/// `result` is set iff the status is success; `error` iff failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingResult {
    pub document_id: DocumentId,
    pub name: String,
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub tokens_used: u64,
    pub cost: Decimal,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl ProcessingResult {
    pub fn success(
        document: &Document,
        text: String,
        usage: TokenUsage,
        cost: Decimal,
        elapsed: Duration,
    ) -> Self {
        Self {
            document_id: document.id.clone(),
            name: document.name.clone(),
            status: ResultStatus::Success,
            result: Some(text),
            error: None,
            tokens_used: usage.total(),
            cost,
            elapsed,
        }
    }

    pub fn failed(document: &Document, error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            document_id: document.id.clone(),
            name: document.name.clone(),
            status: ResultStatus::Failed,
            result: None,
            error: Some(error.into()),
            tokens_used: 0,
            cost: Decimal::ZERO,
            elapsed,
        }
    }

    pub fn skipped(document: &Document) -> Self {
        Self {
            document_id: document.id.clone(),
            name: document.name.clone(),
            status: ResultStatus::Skipped,
            result: None,
            error: None,
            tokens_used: 0,
            cost: Decimal::ZERO,
            elapsed: Duration::ZERO,
        }
    }
}

/// Status counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchSummary {
    /// Tally the statuses of a result list.
    #[must_use]
    pub fn from_results(results: &[ProcessingResult]) -> Self {
        results.iter().fold(
            Self {
                total: results.len(),
                ..Self::default()
            },
            |mut summary, r| {
                match r.status {
                    ResultStatus::Success => summary.successful += 1,
                    ResultStatus::Failed => summary.failed += 1,
                    ResultStatus::Skipped => summary.skipped += 1,
                }
                summary
            },
        )
    }
}

/// Everything a caller gets back from one batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: BatchId,
    pub started_at: DateTime<Utc>,
    pub model: String,
    pub results: Vec<ProcessingResult>,
    pub summary: BatchSummary,
    /// Sum of per-document costs.
    pub total_cost: Decimal,
    pub total_tokens: u64,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl BatchReport {
    /// Build a report, deriving the summary and totals from `results`.
    pub fn new(
        batch_id: BatchId,
        started_at: DateTime<Utc>,
        model: impl Into<String>,
        results: Vec<ProcessingResult>,
        elapsed: Duration,
    ) -> Self {
        let summary = BatchSummary::from_results(&results);
        let total_cost = results.iter().map(|r| r.cost).sum();
        let total_tokens = results
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.tokens_used));
        Self {
            batch_id,
            started_at,
            model: model.into(),
            results,
            summary,
            total_cost,
            total_tokens,
            elapsed,
        }
    }

    /// Look up the result for one document.
    #[must_use]
    pub fn result_for(&self, id: &str) -> Option<&ProcessingResult> {
        self.results.iter().find(|r| r.document_id.as_str() == id)
    }

    /// Sort results by document id for stable presentation.
    pub fn sort_by_id(&mut self) {
        self.results
            .sort_by(|a, b| a.document_id.cmp(&b.document_id));
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}
