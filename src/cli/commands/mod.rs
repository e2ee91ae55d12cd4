//! CLI command implementations.

pub mod backtest;
pub mod hft;
pub mod models;
pub mod snapshot;
pub mod trade;
pub mod validate;
pub mod watch;

use anyhow::{Context, Result};
use dashboard_client::ApiClient;
use dashboard_config::AppConfig;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Build the backend client from configuration.
fn client(config: &AppConfig) -> Result<ApiClient> {
    ApiClient::new(config.api.client_config()).context("Failed to create API client")
}

/// Read a JSON document from a file.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
