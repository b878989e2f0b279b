//! Provider-agnostic domain types: documents, tasks, results, and pricing.

mod document;
mod id;
mod result;
mod task;
mod usage;

pub mod pricing;

pub use document::Document;
pub use id::{BatchId, DocumentId};
pub use result::{BatchReport, BatchSummary, ProcessingResult, ResultStatus};
pub use task::{TaskCategory, TaskSpec, MAX_CONCURRENCY, MAX_TEMPERATURE};
pub use usage::{TokenUsage, UsageRecord};
