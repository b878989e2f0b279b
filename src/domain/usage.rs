//! Token usage reported by the upstream service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DocumentId;

/// Token counts for one upstream call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    #[must_use]
    pub const fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Input plus output, saturating.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Cost record delivered to the usage sink once per successful call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRecord {
    pub document_id: DocumentId,
    pub model: String,
    pub usage: TokenUsage,
    pub cost: Decimal,
}
