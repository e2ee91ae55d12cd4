//! Equity curve points.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::timestamp::lenient;

/// One point on the account equity curve.
///
/// Some backend routes only report `timestamp` and `equity`; the breakdown
/// fields default to zero in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    #[serde(with = "lenient")]
    pub timestamp: DateTime<Utc>,
    pub equity: Decimal,
    #[serde(default)]
    pub cash: Decimal,
    #[serde(default)]
    pub positions_value: Decimal,
}

impl EquityPoint {
    pub fn new(timestamp: DateTime<Utc>, cash: Decimal, positions_value: Decimal) -> Self {
        Self {
            timestamp,
            equity: cash + positions_value,
            cash,
            positions_value,
        }
    }

    /// `equity == cash + positions_value`. Expected but never enforced.
    pub fn is_balanced(&self) -> bool {
        self.equity == self.cash + self.positions_value
    }
}
