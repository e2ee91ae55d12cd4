//! Fan-out/fan-in refresh of the dashboard snapshot.

use chrono::Utc;
use dashboard_core::error::ApiError;
use dashboard_core::traits::DashboardApi;
use dashboard_core::types::{
    DashboardSnapshot, EquityPoint, MarketBar, OrderBookSnapshot, Position, Selection, Slot, Trade,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Identifies the cycle a fetch result belongs to.
#[derive(Debug, Clone)]
struct Ticket {
    generation: u64,
    cycle: u64,
    selection: Selection,
}

#[derive(Debug)]
struct State {
    selection: Selection,
    generation: u64,
    next_cycle: u64,
    last_applied_cycle: u64,
    snapshot: Arc<DashboardSnapshot>,
}

/// Results of one fan-out, one entry per slot.
struct CycleResults {
    trades: Result<Vec<Trade>, ApiError>,
    positions: Result<Vec<Position>, ApiError>,
    equity: Result<Vec<EquityPoint>, ApiError>,
    market_data: Result<Vec<MarketBar>, ApiError>,
    order_book: Result<OrderBookSnapshot, ApiError>,
}

/// Dashboard data aggregator.
///
/// The single writer of the dashboard snapshot. Each refresh cycle issues the
/// five slot fetches concurrently and publishes one replacement snapshot.
/// Results are applied only if they belong to the current selection
/// generation and are newer than the last applied cycle, so a slow response
/// for an old selection can never overwrite data for the new one.
pub struct Aggregator {
    api: Arc<dyn DashboardApi>,
    market_data_limit: usize,
    state: Mutex<State>,
    tx: watch::Sender<Arc<DashboardSnapshot>>,
}

impl Aggregator {
    /// Create an aggregator for an initial selection.
    pub fn new(api: Arc<dyn DashboardApi>, selection: Selection, market_data_limit: usize) -> Self {
        let snapshot = Arc::new(DashboardSnapshot::empty(selection.clone(), 0));
        let (tx, _) = watch::channel(Arc::clone(&snapshot));

        Self {
            api,
            market_data_limit,
            state: Mutex::new(State {
                selection,
                generation: 0,
                next_cycle: 0,
                last_applied_cycle: 0,
                snapshot,
            }),
            tx,
        }
    }

    /// Run one cycle for `params`, adopting them first if they differ from
    /// the current selection.
    pub async fn refresh(&self, params: &Selection) -> Arc<DashboardSnapshot> {
        self.set_params(params);
        self.refresh_current().await
    }

    /// Run one cycle for the current selection.
    ///
    /// Returns the published snapshot after the cycle. If the cycle was
    /// superseded while in flight, its results are dropped and the current
    /// snapshot is returned unchanged.
    pub async fn refresh_current(&self) -> Arc<DashboardSnapshot> {
        let ticket = self.begin_cycle();
        let results = self.fetch(&ticket.selection).await;
        self.apply(ticket, results)
    }

    /// Adopt a new selection.
    ///
    /// Bumps the generation so in-flight cycles for the old selection are
    /// discarded on arrival, and publishes an invalidated snapshot with the
    /// selection-scoped slots cleared. Returns `false` if `params` equal the
    /// current selection.
    pub fn set_params(&self, params: &Selection) -> bool {
        let mut state = self.lock();
        if state.selection == *params {
            return false;
        }

        state.generation += 1;
        state.selection = params.clone();
        let snapshot = Arc::new(state.snapshot.invalidated(params.clone(), state.generation));
        state.snapshot = Arc::clone(&snapshot);
        let generation = state.generation;
        drop(state);

        info!(generation, "Selection changed to {}", params);
        self.tx.send_replace(snapshot);
        true
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        Arc::clone(&self.lock().snapshot)
    }

    /// Subscribe to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardSnapshot>> {
        self.tx.subscribe()
    }

    pub fn selection(&self) -> Selection {
        self.lock().selection.clone()
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn api_name(&self) -> &str {
        self.api.name()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_cycle(&self) -> Ticket {
        let mut state = self.lock();
        state.next_cycle += 1;
        Ticket {
            generation: state.generation,
            cycle: state.next_cycle,
            selection: state.selection.clone(),
        }
    }

    async fn fetch(&self, selection: &Selection) -> CycleResults {
        let api = self.api.as_ref();
        let (trades, positions, equity, market_data, order_book) = tokio::join!(
            api.get_trades(),
            api.get_positions(),
            api.get_equity_curve(),
            api.get_market_data(selection.symbol(), selection.interval(), self.market_data_limit),
            api.get_order_book(selection.exchange(), selection.symbol()),
        );

        CycleResults {
            trades,
            positions,
            equity,
            market_data,
            order_book,
        }
    }

    fn apply(&self, ticket: Ticket, results: CycleResults) -> Arc<DashboardSnapshot> {
        let mut state = self.lock();

        if ticket.generation != state.generation || ticket.cycle <= state.last_applied_cycle {
            debug!(
                cycle = ticket.cycle,
                generation = ticket.generation,
                current_generation = state.generation,
                last_applied = state.last_applied_cycle,
                "Discarding stale cycle for {}",
                ticket.selection
            );
            return Arc::clone(&state.snapshot);
        }

        let prev = &state.snapshot;
        let mut stale_slots = Vec::new();
        let mut next = DashboardSnapshot {
            selection: ticket.selection.clone(),
            generation: ticket.generation,
            trades: keep_on_failure(Slot::Trades, results.trades, &prev.trades, &mut stale_slots),
            positions: keep_on_failure(
                Slot::Positions,
                results.positions,
                &prev.positions,
                &mut stale_slots,
            ),
            equity: keep_on_failure(Slot::Equity, results.equity, &prev.equity, &mut stale_slots),
            market_data: keep_on_failure(
                Slot::MarketData,
                results.market_data,
                &prev.market_data,
                &mut stale_slots,
            ),
            order_book: keep_on_failure(
                Slot::OrderBook,
                results.order_book,
                &prev.order_book,
                &mut stale_slots,
            ),
            stale_slots: Vec::new(),
            updated_at: Some(Utc::now()),
        };
        next.stale_slots = stale_slots;

        let issues = next.inconsistencies();
        if let Some(first) = issues.first() {
            warn!(
                count = issues.len(),
                "Backend sent inconsistent records for {}, first: {}",
                ticket.selection,
                first
            );
        }

        debug!(
            cycle = ticket.cycle,
            generation = ticket.generation,
            stale = next.stale_slots.len(),
            "Applied cycle for {}",
            ticket.selection
        );

        let snapshot = Arc::new(next);
        state.last_applied_cycle = ticket.cycle;
        state.snapshot = Arc::clone(&snapshot);
        drop(state);

        self.tx.send_replace(Arc::clone(&snapshot));
        snapshot
    }
}

/// Take a fetched value, or keep the previous one and mark the slot stale.
fn keep_on_failure<T: Clone>(
    slot: Slot,
    result: Result<T, ApiError>,
    previous: &T,
    stale: &mut Vec<Slot>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(slot = %slot, "Fetch failed, keeping previous value: {}", e);
            stale.push(slot);
            previous.clone()
        }
    }
}
