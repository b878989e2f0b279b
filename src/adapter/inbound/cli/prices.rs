//! Price table listing.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::output;
use crate::domain::pricing::{DEFAULT_PRICE, PRICE_TABLE};
use crate::error::Result;

#[derive(Tabled)]
struct PriceRow {
    #[tabled(rename = "Model")]
    model: &'static str,
    #[tabled(rename = "Input $/M")]
    input: String,
    #[tabled(rename = "Output $/M")]
    output: String,
}

/// List known model prices.
pub fn list() -> Result<()> {
    if output::is_json() {
        output::json_output(json!({
            "command": "prices",
            "default": DEFAULT_PRICE,
            "models": PRICE_TABLE,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Model prices (USD per million tokens)");

    let rows = PRICE_TABLE
        .iter()
        .chain(std::iter::once(&DEFAULT_PRICE))
        .map(|p| PriceRow {
            model: p.model,
            input: p.input_per_million.to_string(),
            output: p.output_per_million.to_string(),
        });

    output::lines(&Table::new(rows).to_string());
    Ok(())
}
