//! CLI definitions.

pub mod commands;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use dashboard_config::SelectionSettings;
use dashboard_core::types::timestamp::parse_timestamp;
use dashboard_core::types::{Exchange, Interval, OrderType, Selection, Side};
use dashboard_core::ValidationError;
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(author, version, about = "Terminal dashboard and control client for the trading backend")]
pub struct Cli {
    /// Configuration file path (defaults to config/default.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (overrides the configured level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll the backend and show the live dashboard
    Watch(WatchArgs),
    /// Fetch one snapshot and print it
    Snapshot(SnapshotArgs),
    /// Submit a manual trade
    Trade(TradeArgs),
    /// Control the server-side HFT loop
    #[command(subcommand)]
    Hft(HftCommand),
    /// Manage models
    #[command(subcommand)]
    Models(ModelsCommand),
    /// Run a backtest on the backend
    Backtest(BacktestArgs),
    /// Validate configuration
    ValidateConfig,
}

/// Overrides for the configured selection.
#[derive(clap::Args)]
pub struct SelectionArgs {
    /// Exchange (okx, binance)
    #[arg(short, long)]
    pub exchange: Option<Exchange>,

    /// Symbol in the exchange's notation
    #[arg(short = 'S', long)]
    pub symbol: Option<String>,

    /// Bar interval (1m, 5m, 15m, 1h, 4h, 1d)
    #[arg(short, long)]
    pub interval: Option<Interval>,
}

impl SelectionArgs {
    /// Apply the overrides to the configured selection.
    ///
    /// Switching exchange without naming a symbol picks that exchange's
    /// first symbol.
    pub fn resolve(&self, defaults: &SelectionSettings) -> Result<Selection, ValidationError> {
        let exchange = self.exchange.unwrap_or(defaults.exchange);
        let symbol = match (&self.symbol, self.exchange) {
            (Some(symbol), _) => symbol.clone(),
            (None, Some(exchange)) if exchange != defaults.exchange => {
                exchange.symbols()[0].to_string()
            }
            _ => defaults.symbol.clone(),
        };
        let interval = self.interval.unwrap_or(defaults.interval);

        Selection::new(exchange, symbol, interval)
    }
}

#[derive(clap::Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Polling interval in milliseconds (overrides the configured interval)
    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// Print a line per snapshot instead of running the TUI
    #[arg(long)]
    pub headless: bool,
}

#[derive(clap::Args)]
pub struct SnapshotArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Also fetch technical indicators for the selection
    #[arg(long)]
    pub indicators: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct TradeArgs {
    /// Symbol to trade
    #[arg(short = 'S', long)]
    pub symbol: String,

    /// Side (buy, sell)
    #[arg(long)]
    pub side: Side,

    /// Quantity
    #[arg(short, long)]
    pub quantity: Decimal,

    /// Order type (market, limit)
    #[arg(short = 't', long = "type", default_value = "market")]
    pub order_type: OrderType,

    /// Limit price
    #[arg(short, long)]
    pub price: Option<Decimal>,
}

#[derive(Subcommand)]
pub enum HftCommand {
    /// Start the HFT loop
    Start(HftStartArgs),
    /// Stop the HFT loop
    Stop {
        /// Symbol the loop runs on
        #[arg(short = 'S', long)]
        symbol: String,
    },
    /// Show the HFT loop status
    Status {
        /// Symbol the loop runs on
        #[arg(short = 'S', long)]
        symbol: String,
    },
}

#[derive(clap::Args)]
pub struct HftStartArgs {
    /// Symbol to run on
    #[arg(short = 'S', long)]
    pub symbol: String,

    /// Exchange (defaults to the configured one)
    #[arg(short, long)]
    pub exchange: Option<Exchange>,

    /// Seconds between strategy ticks
    #[arg(long)]
    pub tick_interval: Option<f64>,

    /// Maximum position as a fraction of capital
    #[arg(long)]
    pub position_limit: Option<f64>,

    /// Minimum spread required to quote
    #[arg(long)]
    pub min_spread: Option<f64>,

    /// Minimum expected profit per round trip
    #[arg(long)]
    pub min_profit: Option<f64>,
}

#[derive(Subcommand)]
pub enum ModelsCommand {
    /// List saved models
    List {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
    /// Show a model's configuration
    Show { name: String },
    /// Create a model from a JSON definition ({"input_size": .., "layers": [..]})
    Create {
        /// Model definition file
        file: PathBuf,
        /// Name to save the model under
        #[arg(long)]
        name: Option<String>,
    },
    /// Upload model weights (.pth or .pt)
    Upload {
        /// Weights file
        file: PathBuf,
    },
    /// Delete a model
    Delete { name: String },
    /// Start training a model
    Train {
        name: String,
        #[arg(long, default_value = "100")]
        epochs: u32,
        #[arg(long, default_value = "32")]
        batch_size: u32,
        #[arg(long, default_value = "0.001")]
        learning_rate: f64,
    },
}

#[derive(clap::Args)]
pub struct BacktestArgs {
    /// Symbol to backtest
    #[arg(short = 'S', long)]
    pub symbol: String,

    /// Bar interval
    #[arg(short, long, default_value = "1h")]
    pub interval: Interval,

    /// Start (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_parser = parse_time)]
    pub start: DateTime<Utc>,

    /// End (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_parser = parse_time)]
    pub end: DateTime<Utc>,

    /// Initial capital
    #[arg(long, default_value = "10000")]
    pub capital: f64,

    /// Fraction of capital per position
    #[arg(long, default_value = "0.1")]
    pub position_size: f64,

    /// Stop loss as a fraction of entry
    #[arg(long, default_value = "0.02")]
    pub stop_loss: f64,

    /// Take profit as a fraction of entry
    #[arg(long, default_value = "0.04")]
    pub take_profit: f64,

    /// JSON file with the model layers to backtest
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Save results to file
    #[arg(long)]
    pub save: Option<PathBuf>,
}

/// Parse a date or timestamp argument. Bare dates are midnight UTC.
fn parse_time(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Some(ts) = parse_timestamp(raw) {
        return Ok(ts);
    }
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid date '{}', expected YYYY-MM-DD or RFC 3339", raw))
}
