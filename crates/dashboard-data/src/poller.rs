//! Polling lifecycle around the aggregator.

use dashboard_core::types::Selection;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::aggregator::Aggregator;

const MIN_PERIOD: Duration = Duration::from_millis(10);

/// Poller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// No timer.
    Idle,
    /// Timer active.
    Polling,
}

impl fmt::Display for PollerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollerState::Idle => write!(f, "IDLE"),
            PollerState::Polling => write!(f, "POLLING"),
        }
    }
}

struct PollTask {
    handle: JoinHandle<()>,
    wake: Arc<Notify>,
    period: Duration,
}

/// Drives the aggregator on a fixed cadence.
///
/// At most one timer task exists per poller. Stopping, or dropping the
/// poller, aborts the timer task together with any cycle it has in flight.
pub struct Poller {
    aggregator: Arc<Aggregator>,
    task: Mutex<Option<PollTask>>,
}

impl Poller {
    pub fn new(aggregator: Arc<Aggregator>) -> Self {
        Self {
            aggregator,
            task: Mutex::new(None),
        }
    }

    pub fn aggregator(&self) -> &Arc<Aggregator> {
        &self.aggregator
    }

    /// Start polling every `period`, with the first cycle issued immediately.
    ///
    /// Returns `false` without creating a second timer if already polling.
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, period: Duration) -> bool {
        let mut task = self.lock();
        if let Some(running) = task.as_ref().filter(|t| !t.handle.is_finished()) {
            warn!(
                period_ms = running.period.as_millis() as u64,
                "Poller already running, ignoring start"
            );
            return false;
        }

        let period = period.max(MIN_PERIOD);
        let wake = Arc::new(Notify::new());
        let handle = tokio::spawn(run(Arc::clone(&self.aggregator), period, Arc::clone(&wake)));
        *task = Some(PollTask {
            handle,
            wake,
            period,
        });

        info!(
            period_ms = period.as_millis() as u64,
            "Polling {} via {}",
            self.aggregator.selection(),
            self.aggregator.api_name()
        );
        true
    }

    /// Stop polling. Returns `false` if the poller was idle.
    pub fn stop(&self) -> bool {
        match self.lock().take() {
            Some(task) => {
                task.handle.abort();
                info!("Polling stopped");
                true
            }
            None => false,
        }
    }

    pub fn state(&self) -> PollerState {
        match self.lock().as_ref() {
            Some(task) if !task.handle.is_finished() => PollerState::Polling,
            _ => PollerState::Idle,
        }
    }

    /// Adopt new parameters.
    ///
    /// While polling, an immediate cycle is requested without resetting the
    /// timer cadence. While idle, the selection is recorded and nothing is
    /// fetched.
    pub fn on_params_change(&self, params: &Selection) {
        if !self.aggregator.set_params(params) {
            debug!("Selection unchanged: {}", params);
            return;
        }

        if let Some(task) = self.lock().as_ref() {
            task.wake.notify_one();
        }
    }

    /// Request a cycle now.
    ///
    /// While polling this wakes the timer task; while idle a one-off cycle is
    /// spawned. Must be called from within a Tokio runtime.
    pub fn refresh_now(&self) {
        let task = self.lock();
        match task.as_ref() {
            Some(task) if !task.handle.is_finished() => task.wake.notify_one(),
            _ => {
                drop(task);
                let aggregator = Arc::clone(&self.aggregator);
                tokio::spawn(async move {
                    aggregator.refresh_current().await;
                });
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<PollTask>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Timer loop. Cycles run in a `JoinSet` owned by this task, so aborting the
/// task aborts them too.
async fn run(aggregator: Arc<Aggregator>, period: Duration, wake: Arc<Notify>) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut cycles = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !cycles.is_empty() {
                    debug!("Previous cycle still in flight, skipping tick");
                    continue;
                }
            }
            _ = wake.notified() => {
                debug!("Refresh requested");
            }
            Some(joined) = cycles.join_next(), if !cycles.is_empty() => {
                if let Err(e) = joined {
                    if e.is_panic() {
                        error!("Refresh cycle panicked: {}", e);
                    }
                }
                continue;
            }
        }

        let aggregator = Arc::clone(&aggregator);
        cycles.spawn(async move {
            aggregator.refresh_current().await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeApi;
    use dashboard_core::types::Slot;

    const PERIOD: Duration = Duration::from_secs(5);

    fn setup() -> (Arc<FakeApi>, Poller) {
        let api = Arc::new(FakeApi::new());
        let aggregator = Arc::new(Aggregator::new(api.clone(), Selection::default(), 10));
        (api, Poller::new(aggregator))
    }

    /// Let spawned tasks run until they block on time.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_cycle_is_immediate_then_periodic() {
        let (api, poller) = setup();
        assert_eq!(poller.state(), PollerState::Idle);

        assert!(poller.start(PERIOD));
        assert_eq!(poller.state(), PollerState::Polling);
        settle().await;
        assert_eq!(api.calls(Slot::Trades), 1);

        tokio::time::sleep(PERIOD).await;
        settle().await;
        assert_eq!(api.calls(Slot::Trades), 2);

        tokio::time::sleep(PERIOD * 2).await;
        settle().await;
        assert_eq!(api.calls(Slot::Trades), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_keeps_one_timer() {
        let (api, poller) = setup();

        assert!(poller.start(PERIOD));
        assert!(!poller.start(PERIOD));
        assert!(!poller.start(Duration::from_secs(1)));
        settle().await;
        assert_eq!(api.calls(Slot::Trades), 1);

        tokio::time::sleep(PERIOD * 3).await;
        settle().await;
        assert_eq!(api.calls(Slot::Trades), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_fetches_after_stop() {
        let (api, poller) = setup();
        poller.start(PERIOD);
        settle().await;

        assert!(poller.stop());
        assert!(!poller.stop());
        assert_eq!(poller.state(), PollerState::Idle);
        let calls = api.total_calls();

        tokio::time::sleep(PERIOD * 10).await;
        settle().await;
        assert_eq!(api.total_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_drops_in_flight_cycle() {
        let (api, poller) = setup();
        api.delay("BTC-USDT", Duration::from_secs(2));
        poller.start(PERIOD);
        settle().await;
        assert_eq!(api.calls(Slot::MarketData), 1);

        poller.stop();
        tokio::time::sleep(PERIOD).await;
        settle().await;

        assert!(poller.aggregator().snapshot().updated_at.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_releases_timer() {
        let (api, poller) = setup();
        poller.start(PERIOD);
        settle().await;
        drop(poller);

        let calls = api.total_calls();
        tokio::time::sleep(PERIOD * 4).await;
        settle().await;
        assert_eq!(api.total_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_params_change_while_polling_refreshes_immediately() {
        let (api, poller) = setup();
        poller.start(PERIOD);
        settle().await;
        assert_eq!(api.calls(Slot::OrderBook), 1);

        tokio::time::sleep(Duration::from_secs(1)).await;
        let eth = Selection::default().next_symbol();
        poller.on_params_change(&eth);
        settle().await;

        assert_eq!(api.calls(Slot::OrderBook), 2);
        let snapshot = poller.aggregator().snapshot();
        assert_eq!(snapshot.selection, eth);
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.last_price(), Some(FakeApi::price_of("ETH-USDT")));

        // Cadence is unchanged: the next tick is still due at t = PERIOD.
        tokio::time::sleep(PERIOD - Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(api.calls(Slot::OrderBook), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_params_change_while_idle_fetches_nothing() {
        let (api, poller) = setup();
        let eth = Selection::default().next_symbol();

        poller.on_params_change(&eth);
        settle().await;

        assert_eq!(api.total_calls(), 0);
        assert_eq!(poller.aggregator().selection(), eth);
        assert_eq!(poller.aggregator().generation(), 1);

        poller.start(PERIOD);
        settle().await;
        assert_eq!(poller.aggregator().snapshot().selection, eth);
        assert_eq!(
            poller.aggregator().snapshot().last_price(),
            Some(FakeApi::price_of("ETH-USDT"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_symbol_switch_with_slow_old_response() {
        let (api, poller) = setup();
        api.delay("BTC-USDT", Duration::from_secs(3));
        poller.start(PERIOD);
        settle().await;

        let eth = Selection::default().next_symbol();
        poller.on_params_change(&eth);
        settle().await;
        assert_eq!(poller.aggregator().snapshot().selection, eth);

        tokio::time::sleep(Duration::from_secs(4)).await;
        settle().await;

        let snapshot = poller.aggregator().snapshot();
        assert_eq!(snapshot.selection, eth);
        assert_eq!(snapshot.last_price(), Some(FakeApi::price_of("ETH-USDT")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_now_while_idle_runs_one_cycle() {
        let (api, poller) = setup();
        poller.refresh_now();
        settle().await;

        assert_eq!(api.calls(Slot::Equity), 1);
        assert_eq!(poller.state(), PollerState::Idle);
        assert!(poller.aggregator().snapshot().updated_at.is_some());
    }
}
