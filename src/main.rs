//! Trading dashboard CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use dashboard_config::load_config;
use dashboard_monitor::setup_logging;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.as_deref();
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) if matches!(cli.command, Commands::ValidateConfig) => {
            return cli::commands::validate::report_failure(config_path, e);
        }
        Err(e) => return Err(e).context("Failed to load configuration"),
    };

    // Setup logging. The TUI owns the terminal, so it logs to a file.
    let log_level = cli
        .log_level
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    let json = cli.json_logs || config.logging.format == "json";
    let log_file = match &cli.command {
        Commands::Watch(args) if !args.headless => Some(PathBuf::from(&config.monitor.log_file)),
        _ => config.logging.file.as_ref().map(PathBuf::from),
    };
    if let Some(dir) = log_file.as_ref().and_then(|f| f.parent()) {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {:?}", dir))?;
        }
    }
    let _log_guard = setup_logging(&log_level, json, log_file.as_deref());

    // Execute command
    match cli.command {
        Commands::Watch(args) => cli::commands::watch::run(args, &config).await,
        Commands::Snapshot(args) => cli::commands::snapshot::run(args, &config).await,
        Commands::Trade(args) => cli::commands::trade::run(args, &config).await,
        Commands::Hft(command) => cli::commands::hft::run(command, &config).await,
        Commands::Models(command) => cli::commands::models::run(command, &config).await,
        Commands::Backtest(args) => cli::commands::backtest::run(args, &config).await,
        Commands::ValidateConfig => cli::commands::validate::run(config_path, &config).await,
    }
}
