//! Configuration structures.

use dashboard_client::ApiConfig;
use dashboard_core::error::ValidationError;
use dashboard_core::types::{Exchange, HftParams, Interval, Selection};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub selection: SelectionSettings,
    #[serde(default)]
    pub hft: HftSettings,
    #[serde(default)]
    pub monitor: MonitorSettings,
}

impl AppConfig {
    /// Check values the deserializer cannot.
    pub fn validate(&self) -> Result<(), String> {
        self.api
            .client_config()
            .validate()
            .map_err(|e| format!("api.base_url: {}", e))?;
        if self.polling.interval_ms == 0 {
            return Err("polling.interval_ms must be greater than zero".to_string());
        }
        if self.polling.market_data_limit == 0 {
            return Err("polling.market_data_limit must be greater than zero".to_string());
        }
        if self.monitor.tick_ms == 0 {
            return Err("monitor.tick_ms must be greater than zero".to_string());
        }
        self.selection
            .selection()
            .map_err(|e| format!("selection: {}", e))?;
        self.hft
            .params(&self.selection.symbol, self.selection.exchange)
            .validate()
            .map_err(|e| format!("hft: {}", e))?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "trading-dashboard".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Backend API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: ApiConfig::DEFAULT_BASE_URL.to_string(),
            timeout_ms: 10_000,
            max_retries: 2,
            retry_backoff_ms: 200,
        }
    }
}

impl ApiSettings {
    pub fn client_config(&self) -> ApiConfig {
        ApiConfig::new(self.base_url.clone())
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_retries(self.max_retries, Duration::from_millis(self.retry_backoff_ms))
    }
}

/// Refresh cadence and request sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    pub interval_ms: u64,
    /// Bars requested per market-data fetch
    pub market_data_limit: usize,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            market_data_limit: 1000,
        }
    }
}

impl PollingSettings {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Selection the dashboard opens with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    pub exchange: Exchange,
    pub symbol: String,
    pub interval: Interval,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        let selection = Selection::default();
        Self {
            exchange: selection.exchange(),
            symbol: selection.symbol().to_string(),
            interval: selection.interval(),
        }
    }
}

impl SelectionSettings {
    pub fn selection(&self) -> Result<Selection, ValidationError> {
        Selection::new(self.exchange, self.symbol.clone(), self.interval)
    }
}

/// Default HFT loop parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HftSettings {
    pub tick_interval: f64,
    pub position_limit: f64,
    pub min_spread: f64,
    pub min_profit: f64,
}

impl Default for HftSettings {
    fn default() -> Self {
        Self {
            tick_interval: HftParams::DEFAULT_TICK_INTERVAL,
            position_limit: HftParams::DEFAULT_POSITION_LIMIT,
            min_spread: HftParams::DEFAULT_MIN_SPREAD,
            min_profit: HftParams::DEFAULT_MIN_PROFIT,
        }
    }
}

impl HftSettings {
    pub fn params(&self, symbol: &str, exchange: Exchange) -> HftParams {
        HftParams {
            symbol: symbol.to_string(),
            exchange,
            tick_interval: self.tick_interval,
            position_limit: self.position_limit,
            min_spread: self.min_spread,
            min_profit: self.min_profit,
        }
    }
}

/// Terminal UI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Redraw and input poll period
    pub tick_ms: u64,
    /// Log file used while the TUI owns the terminal
    pub log_file: String,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            tick_ms: 250,
            log_file: "logs/dashboard.log".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.polling.period(), Duration::from_secs(5));
        assert_eq!(
            config.api.client_config().url("/trades"),
            "http://localhost:8000/api/trades"
        );
    }

    #[test]
    fn test_hft_defaults_match_form() {
        let params = HftSettings::default().params("BTC-USDT", Exchange::Okx);
        assert_eq!(params, HftParams::new("BTC-USDT", Exchange::Okx));
    }

    #[test]
    fn test_toml_output_round_trips_sections() {
        let text = AppConfig::default().to_toml().unwrap();
        assert!(text.contains("[polling]"));
        assert!(text.contains("interval_ms = 5000"));
        assert!(text.contains("interval = \"1m\""));
    }
}
