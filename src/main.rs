use std::path::{Path, PathBuf};

use clap::Parser;
use docbatch::adapter::inbound::cli::output::{self, OutputConfig};
use docbatch::adapter::inbound::cli::{check, prices, run, CheckCommand, Cli, Commands};
use docbatch::app::config::Config;
use docbatch::error::Result;
use tracing::{error, info};

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "docbatch.toml";

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet), &cli.color);

    if let Err(e) = dispatch(cli).await {
        error!(error = %e, "Command failed");
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    if matches!(cli.command, Commands::Prices) {
        return prices::list();
    }

    let (config, source) = load_config(cli.config.as_deref())?;
    config.init_logging();
    info!(config = %source, "docbatch starting");

    match cli.command {
        Commands::Run(args) => run::execute(&config, &args).await,
        Commands::Check(CheckCommand::Config) => check::execute_config(&config, &source),
        Commands::Prices => prices::list(),
    }
}

/// Resolve the configuration: explicit path, then the working-directory
/// file, then built-in defaults.
fn load_config(path: Option<&Path>) -> Result<(Config, String)> {
    if let Some(path) = path {
        return Ok((Config::load(path)?, path.display().to_string()));
    }
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.exists() {
        return Ok((Config::load(&local)?, DEFAULT_CONFIG_FILE.to_string()));
    }
    Ok((Config::default(), "built-in defaults".to_string()))
}
