//! Core data types for the dashboard.

mod ack;
mod backtest;
mod equity;
mod hft;
mod indicators;
mod interval;
mod market;
mod model;
mod order;
mod order_book;
mod position;
mod selection;
mod snapshot;
pub mod timestamp;
mod trade;

pub use ack::Ack;
pub use backtest::{BacktestRequest, BacktestResult};
pub use equity::EquityPoint;
pub use hft::{HftParams, HftStatus};
pub use indicators::TechnicalIndicators;
pub use interval::Interval;
pub use market::MarketBar;
pub use model::{
    validate_model_file, Activation, ModelConfig, ModelLayer, ModelList, ModelSummary,
    TrainingConfig, MODEL_FILE_EXTENSIONS,
};
pub use order::{OrderType, Side, TradeRequest};
pub use order_book::{BookSide, Level, OrderBookRow, OrderBookSnapshot};
pub use position::Position;
pub use selection::{Exchange, Selection};
pub use snapshot::{DashboardSnapshot, Slot};
pub use trade::Trade;
