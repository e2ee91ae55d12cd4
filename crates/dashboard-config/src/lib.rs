//! Configuration management.

mod settings;

pub use settings::{
    ApiSettings, AppConfig, AppSettings, HftSettings, LoggingConfig, MonitorSettings,
    PollingSettings, SelectionSettings,
};

pub use config::ConfigError;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use dashboard_client::ApiConfig;
use std::path::Path;

/// File read when no path is given. Optional.
pub const DEFAULT_CONFIG_FILE: &str = "config/default";

/// Load configuration.
///
/// Sources, later ones winning: built-in defaults, the TOML file at `path`
/// (or `config/default.toml` if present), `DASHBOARD__*` environment
/// variables such as `DASHBOARD__POLLING__INTERVAL_MS`, and finally
/// `DASHBOARD_API_URL` for the backend base URL.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };
    finish(Config::builder().add_source(file))
}

/// Load configuration from TOML text, with the same environment overrides.
pub fn load_config_str(toml: &str) -> Result<AppConfig, ConfigError> {
    finish(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = builder
        .add_source(
            Environment::with_prefix("DASHBOARD")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("api.base_url", api_url_override())?
        .build()?
        .try_deserialize()?;

    config.validate().map_err(ConfigError::Message)?;
    Ok(config)
}

fn api_url_override() -> Option<String> {
    std::env::var(ApiConfig::BASE_URL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::types::{Exchange, Interval};

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = load_config_str("").unwrap();
        assert_eq!(config.polling.interval_ms, 5000);
        assert_eq!(config.polling.market_data_limit, 1000);
        assert_eq!(config.selection.exchange, Exchange::Okx);
        assert_eq!(config.selection.symbol, "BTC-USDT");
        assert_eq!(config.hft.position_limit, 0.1);
    }

    #[test]
    fn test_file_values() {
        let config = load_config_str(
            r#"
            [polling]
            interval_ms = 2000

            [selection]
            exchange = "binance"
            symbol = "ETHUSDT"
            interval = "15m"

            [monitor]
            tick_ms = 100
            "#,
        )
        .unwrap();

        assert_eq!(config.polling.interval_ms, 2000);
        assert_eq!(config.polling.market_data_limit, 1000);
        assert_eq!(config.selection.exchange, Exchange::Binance);
        assert_eq!(config.selection.interval, Interval::Minute15);
        assert_eq!(config.monitor.tick_ms, 100);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = load_config_str("[polling]\ninterval_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("interval_ms"));

        let err = load_config_str("[selection]\nsymbol = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("symbol"));

        assert!(load_config_str("[api]\nbase_url = \"localhost\"\n").is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/dashboard.toml"))).is_err());
    }
}
