//! Validate configuration command.

use anyhow::Result;
use dashboard_config::{AppConfig, ConfigError};
use std::path::Path;

fn header(config_path: Option<&Path>) {
    match config_path {
        Some(path) => println!("Validating configuration: {:?}", path),
        None => println!("Validating default configuration"),
    }
}

pub async fn run(config_path: Option<&Path>, config: &AppConfig) -> Result<()> {
    header(config_path);
    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Backend: {}", config.api.base_url);
    println!("Polling every {} ms", config.polling.interval_ms);
    println!();
    println!("# Effective configuration");
    println!("{}", config.to_toml()?);

    Ok(())
}

/// Report a configuration that failed to load.
pub fn report_failure(config_path: Option<&Path>, error: ConfigError) -> Result<()> {
    header(config_path);
    println!("Configuration error: {}", error);
    Err(error.into())
}
