//! Order side, order type and the manual trade form.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Get the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buy" | "b" => Ok(Side::Buy),
            "sell" | "s" => Ok(Side::Sell),
            _ => Err(format!("Invalid side: {}", s)),
        }
    }
}

/// Order type accepted by the backend's manual trade endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Execute immediately at the best available price
    #[default]
    Market,
    /// Execute at the given price or better
    Limit,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
        }
    }
}

impl std::str::FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "market" => Ok(OrderType::Market),
            "limit" => Ok(OrderType::Limit),
            _ => Err(format!("Invalid order type: {}", s)),
        }
    }
}

/// Manual trade form, posted to `/trades`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRequest {
    /// Symbol to trade
    pub symbol: String,
    /// Market or limit
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Buy or sell
    pub side: Side,
    /// Quantity to trade
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    /// Limit price, only for limit orders
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,
}

impl TradeRequest {
    /// Create a market order form.
    pub fn market(symbol: impl Into<String>, side: Side, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            order_type: OrderType::Market,
            side,
            quantity,
            price: None,
        }
    }

    /// Create a limit order form.
    pub fn limit(symbol: impl Into<String>, side: Side, quantity: Decimal, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            order_type: OrderType::Limit,
            side,
            quantity,
            price: Some(price),
        }
    }

    /// Validate the form before submission.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::check_not_empty("symbol", &self.symbol)?;

        if self.quantity <= Decimal::ZERO {
            return Err(ValidationError::NotPositive { field: "quantity" });
        }

        match (self.order_type, self.price) {
            (OrderType::Limit, None) => Err(ValidationError::Missing {
                field: "price",
                context: "limit orders",
            }),
            (OrderType::Limit, Some(price)) if price <= Decimal::ZERO => {
                Err(ValidationError::NotPositive { field: "price" })
            }
            (OrderType::Market, Some(_)) => Err(ValidationError::NotAllowed {
                field: "price",
                context: "market orders",
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_trade_request_market() {
        let request = TradeRequest::market("BTC-USDT", Side::Buy, dec!(0.5));
        assert_eq!(request.order_type, OrderType::Market);
        assert!(request.validate().is_ok());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "market");
        assert_eq!(json["side"], "buy");
        assert_eq!(json["quantity"], 0.5);
        assert!(json.get("price").is_none());
    }

    #[test]
    fn test_trade_request_limit_requires_price() {
        let mut request = TradeRequest::limit("BTC-USDT", Side::Sell, dec!(1), dec!(42000));
        assert!(request.validate().is_ok());

        request.price = None;
        assert_eq!(
            request.validate(),
            Err(ValidationError::Missing {
                field: "price",
                context: "limit orders"
            })
        );
    }

    #[test]
    fn test_trade_request_rejects_bad_quantity() {
        let request = TradeRequest::market("BTC-USDT", Side::Buy, Decimal::ZERO);
        assert_eq!(
            request.validate(),
            Err(ValidationError::NotPositive { field: "quantity" })
        );

        let mut request = TradeRequest::market("BTC-USDT", Side::Buy, dec!(1));
        request.price = Some(dec!(100));
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_side_parse() {
        assert_eq!("BUY".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert!("hold".parse::<Side>().is_err());
    }
}
