//! Dashboard data aggregation and polling.

mod aggregator;
mod poller;

#[cfg(test)]
mod fake;

pub use aggregator::Aggregator;
pub use poller::{Poller, PollerState};

use dashboard_core::traits::DashboardApi;
use dashboard_core::types::Selection;
use std::sync::Arc;
use std::time::Duration;

/// Build an aggregator for `selection` and start polling it every `period`.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_poller(
    api: Arc<dyn DashboardApi>,
    selection: Selection,
    market_data_limit: usize,
    period: Duration,
) -> Poller {
    let aggregator = Arc::new(Aggregator::new(api, selection, market_data_limit));
    let poller = Poller::new(aggregator);
    poller.start(period);
    poller
}
