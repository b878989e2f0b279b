//! CLI output formatting.
//!
//! Human-readable output with colored symbols, or one JSON document per
//! command for scripting. Quiet mode suppresses everything except errors
//! and JSON.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::{OwoColorize, Stream};
use serde_json::json;

use super::ColorChoice;

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

/// Global output configuration singleton.
static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn write_config(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

fn regular_output_suppressed(config: OutputConfig) -> bool {
    !config.json && config.quiet
}

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig, color: &ColorChoice) {
    match color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => owo_colors::unset_override(),
    }
    write_config(config);
}

/// Return whether machine-readable JSON output is enabled.
#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

/// Print the application header with name and version.
pub fn header(version: &str) {
    let config = read_config();
    if config.json || regular_output_suppressed(config) {
        return;
    }
    println!(
        "{} {}",
        "docbatch".if_supports_color(Stream::Stdout, |t| t.bold()),
        version.if_supports_color(Stream::Stdout, |t| t.dimmed())
    );
}

/// Print a section header.
pub fn section(title: &str) {
    let config = read_config();
    if config.json || regular_output_suppressed(config) {
        return;
    }
    println!();
    println!("{}", title.if_supports_color(Stream::Stdout, |t| t.bold()));
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let config = read_config();
    if config.json || regular_output_suppressed(config) {
        return;
    }
    println!(
        "  {:<12} {}",
        label.if_supports_color(Stream::Stdout, |t| t.dimmed()),
        value
    );
}

/// Print a success line.
pub fn success(message: &str) {
    let config = read_config();
    if config.json || regular_output_suppressed(config) {
        return;
    }
    println!("  {} {}", "✓".if_supports_color(Stream::Stdout, |t| t.green()), message);
}

/// Print a warning line.
pub fn warning(message: &str) {
    let config = read_config();
    if config.json {
        return;
    }
    println!("  {} {}", "⚠".if_supports_color(Stream::Stdout, |t| t.yellow()), message);
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    if read_config().json {
        eprintln!(
            "{}",
            json!({
                "type": "error",
                "payload": { "message": message },
            })
        );
        return;
    }
    eprintln!("  {} {}", "×".if_supports_color(Stream::Stderr, |t| t.red()), message);
}

/// Print pre-rendered multi-line content, indented.
pub fn lines(content: &str) {
    let config = read_config();
    if config.json || regular_output_suppressed(config) {
        return;
    }
    for line in content.lines() {
        println!("  {line}");
    }
}

/// Print a JSON document verbatim.
pub fn json_output(value: serde_json::Value) {
    println!("{value}");
}
