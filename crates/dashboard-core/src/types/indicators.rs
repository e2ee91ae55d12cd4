//! Technical indicator rows computed by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp::lenient_option;

/// One row of `/technical-indicators`.
///
/// Values are absent while the rolling windows warm up, and the backend
/// drops the timestamp when it serves rows straight from its indicator table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    #[serde(default, with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ma_20: Option<f64>,
    #[serde(default)]
    pub ma_50: Option<f64>,
    #[serde(default)]
    pub rsi_14: Option<f64>,
    #[serde(default)]
    pub macd: Option<f64>,
    #[serde(default)]
    pub macd_signal: Option<f64>,
    #[serde(default)]
    pub macd_hist: Option<f64>,
}
