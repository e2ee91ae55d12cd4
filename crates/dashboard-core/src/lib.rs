//! Core types and traits for the trading dashboard client.
//!
//! This crate provides the foundational building blocks including:
//! - Dashboard data types (Trade, Position, EquityPoint, MarketBar, OrderBookSnapshot)
//! - The per-cycle `DashboardSnapshot` and the `Selection` it is scoped to
//! - Request types for the control surface (orders, HFT, models, backtests) with validation
//! - The `DashboardApi` trait implemented by backend clients

pub mod types;
pub mod traits;
pub mod error;

pub use error::{ApiError, ValidationError};
pub use types::*;
pub use traits::*;
