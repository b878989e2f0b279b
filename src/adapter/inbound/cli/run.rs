//! Handler for `docbatch run`.

use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use crate::adapter::inbound::cli::{output, RunArgs};
use crate::app::config::Config;
use crate::app::{build_client, build_engine, build_unlimited_engine};
use crate::application::batch::{BatchRequest, CancelSignal};
use crate::domain::{BatchReport, Document, ProcessingResult, ResultStatus, UsageRecord};
use crate::error::Result;
use crate::port::ChannelSink;

/// Widest error message shown in the results table.
const ERROR_COLUMN_WIDTH: usize = 48;

/// Accepted shapes for the input file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputFile {
    Documents(Vec<Document>),
    Request(BatchRequest),
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: ResultStatus,
    #[tabled(rename = "Tokens")]
    tokens: u64,
    #[tabled(rename = "Cost ($)")]
    cost: String,
    #[tabled(rename = "Time")]
    elapsed: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl From<&ProcessingResult> for ResultRow {
    fn from(result: &ProcessingResult) -> Self {
        Self {
            id: result.document_id.to_string(),
            name: result.name.clone(),
            status: result.status,
            tokens: result.tokens_used,
            cost: result.cost.round_dp(6).to_string(),
            elapsed: format!("{:.1}s", result.elapsed.as_secs_f64()),
            error: result
                .error
                .as_deref()
                .map(|e| truncate(e, ERROR_COLUMN_WIDTH))
                .unwrap_or_default(),
        }
    }
}

/// Execute `docbatch run`.
pub async fn execute(config: &Config, args: &RunArgs) -> Result<()> {
    let request = load_request(&args.input, config, args)?;
    let client = build_client(config)?;

    let (sink, mut usage_rx) = ChannelSink::channel();
    let sink = Arc::new(sink);
    let engine = if args.no_rate_limit {
        build_unlimited_engine(config, client, sink)
    } else {
        build_engine(config, client, sink)
    };

    let cancel = CancelSignal::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling queued documents");
                cancel.cancel();
            }
        })
    };

    let documents = request.documents.len();
    if !output::is_json() {
        output::header(env!("CARGO_PKG_VERSION"));
        output::section("Batch");
        output::field("Input", args.input.display());
        output::field("Documents", documents);
        output::field("Task", request.task.as_deref().unwrap_or_default());
    }

    let result = engine.submit_with_cancel(request, &cancel).await;
    ctrl_c.abort();
    let mut report = result?;
    report.sort_by_id();

    let (usage_records, usage_cost) = drain_usage(&mut usage_rx);
    if usage_cost != report.total_cost {
        warn!(
            %usage_cost,
            total_cost = %report.total_cost,
            "Recorded usage does not match report total"
        );
    }
    info!(usage_records, %usage_cost, "Usage drained");

    if let Some(path) = &args.output {
        let body = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, body)?;
    }

    if output::is_json() {
        output::json_output(json!({
            "command": "run",
            "report": report,
            "usage": {
                "records": usage_records,
                "cost": usage_cost,
            },
        }));
    } else {
        render_report(&report, args.output.as_deref());
    }

    Ok(())
}

/// Read the input file and merge task parameters.
///
/// Precedence, highest first: command-line flags, fields in the input
/// file, then `[defaults]` from the configuration.
fn load_request(path: &Path, config: &Config, args: &RunArgs) -> Result<BatchRequest> {
    let content = std::fs::read_to_string(path)?;
    let input: InputFile = serde_json::from_str(&content)?;

    let defaults = &config.defaults;
    let mut request = match input {
        InputFile::Documents(documents) => BatchRequest::new(documents, defaults.task),
        InputFile::Request(request) => request,
    };

    request.task = args
        .task
        .map(|task| task.as_str().to_string())
        .or(request.task)
        .or_else(|| Some(defaults.task.as_str().to_string()));
    if args.instruction.is_some() {
        request.instruction.clone_from(&args.instruction);
    }
    request.temperature = args
        .temperature
        .or(request.temperature)
        .or(Some(defaults.temperature));
    request.max_tokens = args
        .max_tokens
        .or(request.max_tokens)
        .or(Some(defaults.max_tokens));
    request.concurrency = args
        .concurrency
        .or(request.concurrency)
        .or(Some(defaults.concurrency));

    Ok(request)
}

/// Count and sum the usage records the engine reported.
fn drain_usage(rx: &mut UnboundedReceiver<UsageRecord>) -> (usize, Decimal) {
    let mut records = 0usize;
    let mut cost = Decimal::ZERO;
    while let Ok(record) = rx.try_recv() {
        records += 1;
        cost += record.cost;
    }
    (records, cost)
}

fn render_report(report: &BatchReport, saved_to: Option<&Path>) {
    output::section("Results");
    let rows: Vec<ResultRow> = report.results.iter().map(ResultRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    output::lines(&table.to_string());

    let summary = &report.summary;
    output::section("Summary");
    output::field("Batch", &report.batch_id);
    output::field("Model", &report.model);
    output::field(
        "Documents",
        format!(
            "{} total, {} ok, {} failed, {} skipped",
            summary.total, summary.successful, summary.failed, summary.skipped
        ),
    );
    output::field("Tokens", report.total_tokens);
    output::field("Cost", format!("${}", report.total_cost.round_dp(6)));
    output::field("Elapsed", format!("{:.1}s", report.elapsed.as_secs_f64()));

    if let Some(path) = saved_to {
        output::success(&format!("Report written to {}", path.display()));
    }
    if summary.failed > 0 {
        output::warning(&format!("{} document(s) failed", summary.failed));
    } else if summary.successful > 0 {
        output::success("All documents processed");
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
