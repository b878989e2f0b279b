//! Command-line interface for running batches.

pub mod check;
pub mod command;
pub mod output;
pub mod prices;
pub mod run;

pub use command::{CheckCommand, Cli, ColorChoice, Commands, RunArgs};
