//! Backend API trait definition.

use crate::error::ApiError;
use crate::types::{EquityPoint, Exchange, Interval, MarketBar, OrderBookSnapshot, Position, Trade};
use async_trait::async_trait;

/// Read side of the backend API, as consumed by the dashboard aggregator.
///
/// Implementations are constructed explicitly and injected, so tests can
/// substitute their own.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Get recent trades.
    async fn get_trades(&self) -> Result<Vec<Trade>, ApiError>;

    /// Get open positions.
    async fn get_positions(&self) -> Result<Vec<Position>, ApiError>;

    /// Get the account equity curve, oldest point first.
    async fn get_equity_curve(&self) -> Result<Vec<EquityPoint>, ApiError>;

    /// Get market bars.
    ///
    /// # Arguments
    /// * `symbol` - The symbol to fetch
    /// * `interval` - The bar interval
    /// * `limit` - Maximum number of bars
    async fn get_market_data(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<MarketBar>, ApiError>;

    /// Get the order book for a symbol on an exchange.
    async fn get_order_book(
        &self,
        exchange: Exchange,
        symbol: &str,
    ) -> Result<OrderBookSnapshot, ApiError>;

    /// Get the API name, for logging.
    fn name(&self) -> &str;
}
