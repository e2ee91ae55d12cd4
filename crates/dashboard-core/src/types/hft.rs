//! High-frequency trading loop controls.

use serde::{Deserialize, Serialize};

use super::Exchange;
use crate::error::ValidationError;

/// Parameters posted to `/hft/start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HftParams {
    pub symbol: String,
    pub exchange: Exchange,
    /// Seconds between strategy ticks
    pub tick_interval: f64,
    /// Maximum position, as a fraction of capital
    pub position_limit: f64,
    /// Minimum spread required to quote
    pub min_spread: f64,
    /// Minimum expected profit per round trip
    pub min_profit: f64,
}

impl HftParams {
    pub const DEFAULT_TICK_INTERVAL: f64 = 0.1;
    pub const DEFAULT_POSITION_LIMIT: f64 = 0.1;
    pub const DEFAULT_MIN_SPREAD: f64 = 0.0002;
    pub const DEFAULT_MIN_PROFIT: f64 = 0.0001;

    /// Parameters with the form's default values.
    pub fn new(symbol: impl Into<String>, exchange: Exchange) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            tick_interval: Self::DEFAULT_TICK_INTERVAL,
            position_limit: Self::DEFAULT_POSITION_LIMIT,
            min_spread: Self::DEFAULT_MIN_SPREAD,
            min_profit: Self::DEFAULT_MIN_PROFIT,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::check_not_empty("symbol", &self.symbol)?;
        ValidationError::check_min("tick_interval", self.tick_interval, 0.01)?;
        ValidationError::check_range("position_limit", self.position_limit, 0.01, 1.0)?;
        ValidationError::check_min("min_spread", self.min_spread, 0.0001)?;
        ValidationError::check_min("min_profit", self.min_profit, 0.0001)?;
        Ok(())
    }
}

/// Status reported by `/hft/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HftStatus {
    pub running: bool,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub position: f64,
    #[serde(default)]
    pub trades_count: u64,
    #[serde(default)]
    pub pnl: f64,
}
