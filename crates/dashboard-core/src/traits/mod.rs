//! Core traits for the dashboard.

mod api;

pub use api::DashboardApi;
