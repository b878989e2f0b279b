//! Static per-model price table and the cost model.
//!
//! Prices are in USD per million tokens. Lookup is exact first, then by
//! longest matching prefix so dated snapshots (`gpt-4o-2024-08-06`) resolve
//! to their family, then to [`DEFAULT_PRICE`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::TokenUsage;

/// Price entry for one model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelPrice {
    /// Model identifier or family prefix.
    pub model: &'static str,
    /// USD per million input tokens.
    pub input_per_million: Decimal,
    /// USD per million output tokens.
    pub output_per_million: Decimal,
}

/// Entry used for any identifier not in [`PRICE_TABLE`].
pub const DEFAULT_PRICE: ModelPrice = ModelPrice {
    model: "default",
    input_per_million: dec!(0.15),
    output_per_million: dec!(0.60),
};

/// Known models. Order is irrelevant; lookup picks the longest match.
pub const PRICE_TABLE: &[ModelPrice] = &[
    ModelPrice {
        model: "gpt-4o-mini",
        input_per_million: dec!(0.15),
        output_per_million: dec!(0.60),
    },
    ModelPrice {
        model: "gpt-4o",
        input_per_million: dec!(2.50),
        output_per_million: dec!(10.00),
    },
    ModelPrice {
        model: "gpt-4-turbo",
        input_per_million: dec!(10.00),
        output_per_million: dec!(30.00),
    },
    ModelPrice {
        model: "gpt-4",
        input_per_million: dec!(30.00),
        output_per_million: dec!(60.00),
    },
    ModelPrice {
        model: "gpt-3.5-turbo",
        input_per_million: dec!(0.50),
        output_per_million: dec!(1.50),
    },
    ModelPrice {
        model: "claude-3-5-sonnet",
        input_per_million: dec!(3.00),
        output_per_million: dec!(15.00),
    },
    ModelPrice {
        model: "claude-3-5-haiku",
        input_per_million: dec!(0.80),
        output_per_million: dec!(4.00),
    },
    ModelPrice {
        model: "claude-3-opus",
        input_per_million: dec!(15.00),
        output_per_million: dec!(75.00),
    },
    ModelPrice {
        model: "claude-3-haiku",
        input_per_million: dec!(0.25),
        output_per_million: dec!(1.25),
    },
];

const TOKENS_PER_MILLION: Decimal = dec!(1000000);

/// Resolve the price entry for a model identifier.
///
/// Never fails: unknown models get [`DEFAULT_PRICE`].
#[must_use]
pub fn price_for(model: &str) -> &'static ModelPrice {
    let model = model.trim();
    if let Some(exact) = PRICE_TABLE.iter().find(|p| p.model == model) {
        return exact;
    }
    PRICE_TABLE
        .iter()
        .filter(|p| model.starts_with(p.model))
        .max_by_key(|p| p.model.len())
        .unwrap_or(&DEFAULT_PRICE)
}

/// Cost in USD of one call.
#[must_use]
pub fn cost(model: &str, input_tokens: u64, output_tokens: u64) -> Decimal {
    let price = price_for(model);
    Decimal::from(input_tokens) / TOKENS_PER_MILLION * price.input_per_million
        + Decimal::from(output_tokens) / TOKENS_PER_MILLION * price.output_per_million
}

/// Cost in USD of a reported usage record.
#[must_use]
pub fn cost_of(model: &str, usage: TokenUsage) -> Decimal {
    cost(model, usage.input_tokens, usage.output_tokens)
}
