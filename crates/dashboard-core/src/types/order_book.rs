//! Order book snapshots and their depth-table rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp::lenient_option;

/// A price level, encoded on the wire as `[price, size]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Level(pub f64, pub f64);

impl Level {
    #[inline]
    pub fn price(&self) -> f64 {
        self.0
    }

    #[inline]
    pub fn size(&self) -> f64 {
        self.1
    }
}

/// Order book snapshot for one exchange/symbol pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// Bids, best (highest) price first
    #[serde(default)]
    pub bids: Vec<Level>,
    /// Asks, best (lowest) price first
    #[serde(default)]
    pub asks: Vec<Level>,
    #[serde(default, with = "lenient_option")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Which side of the book a depth row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSide {
    Bid,
    Ask,
}

/// One row of the rendered depth table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBookRow {
    pub side: BookSide,
    pub price: f64,
    pub amount: f64,
    /// Running sum of `amount` in row order within the side
    pub total: f64,
}

impl OrderBookSnapshot {
    pub fn new(bids: Vec<Level>, asks: Vec<Level>) -> Self {
        Self {
            bids,
            asks,
            timestamp: None,
        }
    }

    /// Sort both sides by price priority: bids descending, asks ascending.
    pub fn normalized(mut self) -> Self {
        self.bids.sort_by(|a, b| b.price().total_cmp(&a.price()));
        self.asks.sort_by(|a, b| a.price().total_cmp(&b.price()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    pub fn best_bid(&self) -> Option<Level> {
        self.bids.first().copied()
    }

    pub fn best_ask(&self) -> Option<Level> {
        self.asks.first().copied()
    }

    /// Best ask minus best bid.
    pub fn spread(&self) -> Option<f64> {
        Some(self.best_ask()?.price() - self.best_bid()?.price())
    }

    pub fn mid(&self) -> Option<f64> {
        Some((self.best_ask()?.price() + self.best_bid()?.price()) / 2.0)
    }

    /// Rows for a depth table: asks first, farthest price at the top, so both
    /// sides meet at the spread.
    ///
    /// Asks are reversed and then accumulated, bids are accumulated as-is.
    /// Each row carries its side.
    pub fn depth_rows(&self) -> Vec<OrderBookRow> {
        let mut rows = Vec::with_capacity(self.asks.len() + self.bids.len());
        accumulate(self.asks.iter().rev(), BookSide::Ask, &mut rows);
        accumulate(self.bids.iter(), BookSide::Bid, &mut rows);
        rows
    }
}

fn accumulate<'a>(
    levels: impl Iterator<Item = &'a Level>,
    side: BookSide,
    rows: &mut Vec<OrderBookRow>,
) {
    let mut total = 0.0;
    for level in levels {
        total += level.size();
        rows.push(OrderBookRow {
            side,
            price: level.price(),
            amount: level.size(),
            total,
        });
    }
}
