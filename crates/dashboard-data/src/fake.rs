//! In-memory `DashboardApi` for aggregator and poller tests.

use async_trait::async_trait;
use chrono::Utc;
use dashboard_core::error::ApiError;
use dashboard_core::traits::DashboardApi;
use dashboard_core::types::{
    EquityPoint, Exchange, Interval, Level, MarketBar, OrderBookSnapshot, Position, Side, Slot,
    Trade,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Every response carries the per-slot call number, so tests can tell which
/// invocation produced a slot. Market data and order book prices are derived
/// from the symbol.
#[derive(Default)]
pub struct FakeApi {
    calls: [AtomicU64; 5],
    failing: Mutex<HashSet<Slot>>,
    delays: Mutex<HashMap<String, Duration>>,
    skew_pnl: AtomicBool,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, slot: Slot) {
        self.failing.lock().unwrap().insert(slot);
    }

    pub fn recover(&self, slot: Slot) {
        self.failing.lock().unwrap().remove(&slot);
    }

    /// Delay scoped responses for `symbol`.
    pub fn delay(&self, symbol: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(symbol.to_string(), delay);
    }

    /// Report position P&L that disagrees with the prices by 5.
    pub fn skew_pnl(&self, on: bool) {
        self.skew_pnl.store(on, Ordering::SeqCst);
    }

    pub fn calls(&self, slot: Slot) -> u64 {
        self.calls[index(slot)].load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> u64 {
        Slot::ALL.iter().map(|s| self.calls(*s)).sum()
    }

    /// Price the fake quotes for a symbol.
    pub fn price_of(symbol: &str) -> f64 {
        if symbol.starts_with("ETH") {
            3000.0
        } else {
            60000.0
        }
    }

    async fn enter(&self, slot: Slot, symbol: Option<&str>) -> Result<u64, ApiError> {
        let n = self.calls[index(slot)].fetch_add(1, Ordering::SeqCst) + 1;

        let delay = symbol.and_then(|s| self.delays.lock().unwrap().get(s).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(&slot) {
            return Err(ApiError::Status {
                status: 500,
                body: format!("{} unavailable", slot),
            });
        }
        Ok(n)
    }
}

fn index(slot: Slot) -> usize {
    Slot::ALL
        .iter()
        .position(|s| *s == slot)
        .unwrap_or_default()
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn get_trades(&self) -> Result<Vec<Trade>, ApiError> {
        let n = self.enter(Slot::Trades, None).await?;
        Ok(vec![Trade::new(
            Utc::now(),
            Side::Buy,
            Decimal::from(100),
            Decimal::from(n),
        )])
    }

    async fn get_positions(&self) -> Result<Vec<Position>, ApiError> {
        let n = self.enter(Slot::Positions, None).await?;
        let mut position = Position::new(
            "BTC-USDT",
            Decimal::from(n),
            Decimal::from(100),
            Decimal::from(101),
        );
        if self.skew_pnl.load(Ordering::SeqCst) {
            position.unrealized_pnl += Decimal::from(5);
        }
        Ok(vec![position])
    }

    async fn get_equity_curve(&self) -> Result<Vec<EquityPoint>, ApiError> {
        let n = self.enter(Slot::Equity, None).await?;
        Ok(vec![EquityPoint::new(
            Utc::now(),
            Decimal::from(n),
            Decimal::ZERO,
        )])
    }

    async fn get_market_data(
        &self,
        symbol: &str,
        _interval: Interval,
        limit: usize,
    ) -> Result<Vec<MarketBar>, ApiError> {
        let n = self.enter(Slot::MarketData, Some(symbol)).await?;
        let price = Self::price_of(symbol);
        let bar = MarketBar::new(Utc::now(), price, price, price, price, n as f64);
        Ok(vec![bar; limit.min(3)])
    }

    async fn get_order_book(
        &self,
        _exchange: Exchange,
        symbol: &str,
    ) -> Result<OrderBookSnapshot, ApiError> {
        let n = self.enter(Slot::OrderBook, Some(symbol)).await?;
        let price = Self::price_of(symbol);
        Ok(OrderBookSnapshot::new(
            vec![Level(price - 1.0, n as f64)],
            vec![Level(price + 1.0, n as f64)],
        ))
    }

    fn name(&self) -> &str {
        "fake"
    }
}
