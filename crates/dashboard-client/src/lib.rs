//! HTTP client for the trading backend.

mod client;
mod config;

pub use client::ApiClient;
pub use config::ApiConfig;
