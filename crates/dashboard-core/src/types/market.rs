//! OHLCV market bars.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp::lenient;

/// OHLCV bar as served by `/market-data`.
/// Uses f64, the values only feed charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketBar {
    /// Bar open time
    #[serde(with = "lenient")]
    pub timestamp: DateTime<Utc>,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded volume
    #[serde(default)]
    pub volume: f64,
}

impl MarketBar {
    /// Create a new bar.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// `low <= open, close <= high`.
    pub fn is_consistent(&self) -> bool {
        self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }
}
