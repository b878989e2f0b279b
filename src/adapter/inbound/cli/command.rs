//! Command-line interface definitions.
//!
//! Defines the CLI structure for the docbatch application using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::TaskCategory;

/// Batch document processing against an LLM completion API
#[derive(Parser, Debug)]
#[command(name = "docbatch")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file (defaults to ./docbatch.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a JSON file of documents
    Run(RunArgs),

    /// List the model price table
    Prices,

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `docbatch check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file
    Config,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// JSON file holding an array of {id, name, content} documents
    #[arg(short, long)]
    pub input: PathBuf,

    /// Task category [summarize, extract, categorize, analyze]
    #[arg(short, long)]
    pub task: Option<TaskCategory>,

    /// Free-text instruction replacing the task's default prompt
    #[arg(long)]
    pub instruction: Option<String>,

    /// Sampling temperature (0-2)
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Maximum output tokens per document
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Concurrent upstream requests (clamped to 10)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Write the full report, including result texts, to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Disable the request rate limiter
    #[arg(long)]
    pub no_rate_limit: bool,
}
