//! Exchange/symbol/interval selection that scopes a dashboard refresh.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Interval;
use crate::error::ValidationError;

/// Exchanges the backend can serve order books for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    #[default]
    Okx,
    Binance,
}

impl Exchange {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Okx => "okx",
            Exchange::Binance => "binance",
        }
    }

    /// Symbols offered for this exchange, in its own notation.
    pub fn symbols(&self) -> &'static [&'static str] {
        match self {
            Exchange::Okx => &["BTC-USDT", "ETH-USDT"],
            Exchange::Binance => &["BTCUSDT", "ETHUSDT"],
        }
    }

    pub fn all() -> &'static [Exchange] {
        &[Exchange::Okx, Exchange::Binance]
    }

    /// The next exchange in selector order, wrapping around.
    pub fn next(&self) -> Exchange {
        match self {
            Exchange::Okx => Exchange::Binance,
            Exchange::Binance => Exchange::Okx,
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "okx" => Ok(Exchange::Okx),
            "binance" => Ok(Exchange::Binance),
            _ => Err(format!("Invalid exchange: {}", s)),
        }
    }
}

/// The watched parameters of the dashboard.
///
/// Market bars are scoped by symbol and interval, the order book by exchange
/// and symbol. Changing any field invalidates the current snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSelection")]
pub struct Selection {
    exchange: Exchange,
    symbol: String,
    interval: Interval,
}

#[derive(Deserialize)]
struct RawSelection {
    exchange: Exchange,
    symbol: String,
    interval: Interval,
}

impl TryFrom<RawSelection> for Selection {
    type Error = ValidationError;

    fn try_from(raw: RawSelection) -> Result<Self, Self::Error> {
        Selection::new(raw.exchange, raw.symbol, raw.interval)
    }
}

impl Selection {
    /// Create a selection. The symbol must be a non-empty identifier.
    pub fn new(
        exchange: Exchange,
        symbol: impl Into<String>,
        interval: Interval,
    ) -> Result<Self, ValidationError> {
        let symbol = symbol.into();
        ValidationError::check_not_empty("symbol", &symbol)?;

        Ok(Self {
            exchange,
            symbol: symbol.trim().to_string(),
            interval,
        })
    }

    pub fn exchange(&self) -> Exchange {
        self.exchange
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Switch to the next exchange, resetting the symbol to that exchange's first one.
    pub fn next_exchange(&self) -> Selection {
        let exchange = self.exchange.next();
        Selection {
            exchange,
            symbol: exchange.symbols()[0].to_string(),
            interval: self.interval,
        }
    }

    /// Switch to the next symbol of the current exchange.
    pub fn next_symbol(&self) -> Selection {
        let symbols = self.exchange.symbols();
        let idx = symbols
            .iter()
            .position(|s| *s == self.symbol)
            .map(|i| (i + 1) % symbols.len())
            .unwrap_or(0);

        Selection {
            exchange: self.exchange,
            symbol: symbols[idx].to_string(),
            interval: self.interval,
        }
    }

    /// Switch to the next interval.
    pub fn next_interval(&self) -> Selection {
        Selection {
            exchange: self.exchange,
            symbol: self.symbol.clone(),
            interval: self.interval.next(),
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            exchange: Exchange::Okx,
            symbol: Exchange::Okx.symbols()[0].to_string(),
            interval: Interval::Minute1,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.exchange, self.symbol, self.interval)
    }
}
