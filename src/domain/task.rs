//! Task specifications shared by every document in a batch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BatchError, Error, Result};

/// Hard ceiling on concurrent upstream calls, regardless of caller input.
pub const MAX_CONCURRENCY: usize = 10;

/// Highest sampling temperature accepted upstream.
pub const MAX_TEMPERATURE: f64 = 2.0;

/// Canned task categories, each selecting a system instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    #[default]
    Summarize,
    Extract,
    Categorize,
    Analyze,
}

impl TaskCategory {
    /// All categories, in display order.
    pub const ALL: [TaskCategory; 4] = [
        TaskCategory::Summarize,
        TaskCategory::Extract,
        TaskCategory::Categorize,
        TaskCategory::Analyze,
    ];

    /// The system instruction sent upstream for this category.
    #[must_use]
    pub const fn default_prompt(self) -> &'static str {
        match self {
            Self::Summarize => {
                "You are a precise summarizer. Summarize the document in a few short \
                 paragraphs, keeping every key fact, figure, and conclusion. Do not add \
                 information that is not in the document."
            }
            Self::Extract => {
                "You are an information extraction assistant. Extract the key entities, \
                 dates, amounts, and facts from the document as a concise bulleted list. \
                 Only report what the document states."
            }
            Self::Categorize => {
                "You are a document classifier. Assign the document a primary category, \
                 up to three secondary tags, and a one-sentence justification."
            }
            Self::Analyze => {
                "You are an analyst. Analyze the document: identify its purpose, main \
                 arguments, strengths, weaknesses, and any risks or open questions it raises."
            }
        }
    }

    /// Lowercase name used in configs and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::Extract => "extract",
            Self::Categorize => "categorize",
            Self::Analyze => "analyze",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskCategory {
    type Err = BatchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summarize" | "summary" => Ok(Self::Summarize),
            "extract" => Ok(Self::Extract),
            "categorize" | "classify" => Ok(Self::Categorize),
            "analyze" | "analysis" => Ok(Self::Analyze),
            other => Err(BatchError::UnsupportedTask(other.to_string())),
        }
    }
}

/// Parameters applied to every document of one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Canned category selecting the default prompt.
    pub category: TaskCategory,
    /// Free-text instruction replacing the category prompt when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    /// Sampling temperature, 0 to 2.
    pub temperature: f64,
    /// Maximum output tokens per document.
    pub max_tokens: u32,
    /// Requested concurrency before clamping.
    pub concurrency: usize,
}

impl TaskSpec {
    /// Create a task spec with default sampling parameters.
    #[must_use]
    pub fn new(category: TaskCategory) -> Self {
        Self {
            category,
            instruction: None,
            temperature: 0.3,
            max_tokens: 1024,
            concurrency: 5,
        }
    }

    #[must_use]
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// The system instruction for this task.
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        self.instruction
            .as_deref()
            .unwrap_or_else(|| self.category.default_prompt())
    }

    /// Concurrency after clamping to `1..=MAX_CONCURRENCY`.
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, MAX_CONCURRENCY)
    }

    /// Reject out-of-range sampling parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTask`] for an out-of-range temperature, a
    /// zero token budget, or a blank override instruction.
    pub fn validate(&self) -> Result<()> {
        if !self.temperature.is_finite() || !(0.0..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(Error::InvalidTask(format!(
                "temperature must be between 0 and {MAX_TEMPERATURE}, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(Error::InvalidTask("max_tokens must be positive".into()));
        }
        if let Some(instruction) = &self.instruction {
            if instruction.trim().is_empty() {
                return Err(Error::InvalidTask("instruction cannot be blank".into()));
            }
        }
        Ok(())
    }
}

impl Default for TaskSpec {
    fn default() -> Self {
        Self::new(TaskCategory::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_categories_case_insensitively() {
        assert_eq!("Summarize".parse::<TaskCategory>(), Ok(TaskCategory::Summarize));
        assert_eq!(" extract ".parse::<TaskCategory>(), Ok(TaskCategory::Extract));
        assert_eq!("classify".parse::<TaskCategory>(), Ok(TaskCategory::Categorize));
        assert_eq!(
            "translate".parse::<TaskCategory>(),
            Err(BatchError::UnsupportedTask("translate".into()))
        );
    }

    #[test]
    fn instruction_overrides_category_prompt() {
        let task = TaskSpec::new(TaskCategory::Analyze);
        assert_eq!(task.system_prompt(), TaskCategory::Analyze.default_prompt());

        let task = task.with_instruction("Translate to French.");
        assert_eq!(task.system_prompt(), "Translate to French.");
    }

    #[test]
    fn concurrency_is_clamped() {
        assert_eq!(TaskSpec::default().with_concurrency(50).effective_concurrency(), 10);
        assert_eq!(TaskSpec::default().with_concurrency(0).effective_concurrency(), 1);
        assert_eq!(TaskSpec::default().with_concurrency(3).effective_concurrency(), 3);
    }

    #[test]
    fn validate_rejects_out_of_range_temperature() {
        assert!(TaskSpec::default().with_temperature(2.0).validate().is_ok());
        assert!(matches!(
            TaskSpec::default().with_temperature(2.5).validate(),
            Err(Error::InvalidTask(_))
        ));
        assert!(matches!(
            TaskSpec::default().with_temperature(-0.1).validate(),
            Err(Error::InvalidTask(_))
        ));
        assert!(matches!(
            TaskSpec::default().with_temperature(f64::NAN).validate(),
            Err(Error::InvalidTask(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_tokens_and_blank_instruction() {
        assert!(matches!(
            TaskSpec::default().with_max_tokens(0).validate(),
            Err(Error::InvalidTask(_))
        ));
        assert!(matches!(
            TaskSpec::default().with_instruction("   ").validate(),
            Err(Error::InvalidTask(_))
        ));
    }
}
