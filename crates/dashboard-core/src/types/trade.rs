//! Executed trades reported by the backend.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::timestamp::lenient;
use super::Side;

/// A single executed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Execution time
    #[serde(with = "lenient")]
    pub timestamp: DateTime<Utc>,
    /// Buy or sell (the backend calls this field `type`)
    #[serde(rename = "type")]
    pub side: Side,
    /// Execution price
    pub price: Decimal,
    /// Executed quantity
    pub quantity: Decimal,
    /// Realized P&L, present on closing trades
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnl: Option<Decimal>,
}

impl Trade {
    /// Create a trade without realized P&L.
    pub fn new(timestamp: DateTime<Utc>, side: Side, price: Decimal, quantity: Decimal) -> Self {
        Self {
            timestamp,
            side,
            price,
            quantity,
            pnl: None,
        }
    }

    /// Attach realized P&L.
    pub fn with_pnl(mut self, pnl: Decimal) -> Self {
        self.pnl = Some(pnl);
        self
    }

    /// Price and quantity are non-negative.
    pub fn is_valid(&self) -> bool {
        self.price >= Decimal::ZERO && self.quantity >= Decimal::ZERO
    }
}
