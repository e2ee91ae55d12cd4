//! Open positions reported by the backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A position in a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Symbol
    pub symbol: String,
    /// Position size (positive for long, negative for short)
    pub quantity: Decimal,
    /// Average entry price
    pub entry_price: Decimal,
    /// Current market price
    pub current_price: Decimal,
    /// Unrealized profit/loss as reported by the backend
    pub unrealized_pnl: Decimal,
}

impl Position {
    /// Create a position with P&L derived from the prices.
    pub fn new(
        symbol: impl Into<String>,
        quantity: Decimal,
        entry_price: Decimal,
        current_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            entry_price,
            current_price,
            unrealized_pnl: (current_price - entry_price) * quantity,
        }
    }

    /// Unrealized P&L implied by the prices. The signed quantity makes the
    /// formula hold for shorts as well.
    pub fn expected_unrealized_pnl(&self) -> Decimal {
        (self.current_price - self.entry_price) * self.quantity
    }

    /// Whether the reported P&L agrees with the prices within `tolerance`.
    pub fn is_pnl_consistent(&self, tolerance: Decimal) -> bool {
        (self.unrealized_pnl - self.expected_unrealized_pnl()).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_position_long() {
        let position = Position::new("BTC-USDT", dec!(2), dec!(100), dec!(110));
        assert_eq!(position.unrealized_pnl, dec!(20));
        assert_eq!(position.expected_unrealized_pnl(), dec!(20));
    }

    #[test]
    fn test_position_short_sign_convention() {
        let position = Position::new("ETH-USDT", dec!(-3), dec!(2000), dec!(1900));
        assert_eq!(position.unrealized_pnl, dec!(300));
        assert!(position.is_pnl_consistent(Decimal::ZERO));
    }

    #[test]
    fn test_position_inconsistent_report() {
        let json = r#"{
            "symbol": "BTCUSDT",
            "quantity": 1.0,
            "entry_price": 100.0,
            "current_price": 105.0,
            "unrealized_pnl": 7.0
        }"#;
        let position: Position = serde_json::from_str(json).unwrap();
        assert!(!position.is_pnl_consistent(dec!(0.01)));
        assert!(position.is_pnl_consistent(dec!(2)));
    }
}
