//! Batch submission: request shape validation before the engine runs.

use std::collections::HashSet;

use serde::Deserialize;

use crate::domain::{Document, TaskCategory, TaskSpec};
use crate::error::{BatchError, Result};

/// Maximum documents accepted in one batch.
pub const MAX_DOCUMENTS: usize = 100;

/// A caller's batch, as received over the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    pub documents: Vec<Document>,
    /// Task category name, e.g. `"summarize"`. Defaults to summarize.
    #[serde(default)]
    pub task: Option<String>,
    /// Free-text instruction overriding the category prompt.
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub concurrency: Option<usize>,
}

/// A request that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedBatch {
    pub documents: Vec<Document>,
    pub task: TaskSpec,
}

impl BatchRequest {
    /// Create a request for `documents` with default task parameters.
    pub fn new(documents: Vec<Document>, task: TaskCategory) -> Self {
        Self {
            documents,
            task: Some(task.as_str().to_string()),
            instruction: None,
            temperature: None,
            max_tokens: None,
            concurrency: None,
        }
    }

    /// Check the request shape and build the task spec.
    ///
    /// Missing sampling parameters fall back to [`TaskSpec::new`] defaults;
    /// concurrency is clamped later by the scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`] for an empty or oversized batch, duplicate
    /// document ids, or an unknown task category, and
    /// [`Error::InvalidTask`](crate::error::Error::InvalidTask) for
    /// out-of-range sampling parameters.
    pub fn validate(self) -> Result<ValidatedBatch> {
        if self.documents.is_empty() {
            return Err(BatchError::Empty.into());
        }
        if self.documents.len() > MAX_DOCUMENTS {
            return Err(BatchError::TooManyDocuments {
                count: self.documents.len(),
                max: MAX_DOCUMENTS,
            }
            .into());
        }

        let mut seen = HashSet::with_capacity(self.documents.len());
        for document in &self.documents {
            if !seen.insert(document.id.as_str()) {
                return Err(BatchError::DuplicateId {
                    id: document.id.to_string(),
                }
                .into());
            }
        }

        let category: TaskCategory = match self.task.as_deref() {
            Some(name) => name.parse()?,
            None => TaskCategory::default(),
        };
        let mut task = TaskSpec::new(category);
        if let Some(instruction) = self.instruction {
            task = task.with_instruction(instruction);
        }
        if let Some(temperature) = self.temperature {
            task = task.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            task = task.with_max_tokens(max_tokens);
        }
        if let Some(concurrency) = self.concurrency {
            task = task.with_concurrency(concurrency);
        }
        task.validate()?;

        Ok(ValidatedBatch {
            documents: self.documents,
            task,
        })
    }
}
