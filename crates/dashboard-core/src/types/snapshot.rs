//! The per-cycle dashboard snapshot.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{EquityPoint, MarketBar, OrderBookSnapshot, Position, Selection, Trade};

/// One named category of dashboard data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Trades,
    Positions,
    Equity,
    MarketData,
    OrderBook,
}

impl Slot {
    pub const ALL: [Slot; 5] = [
        Slot::Trades,
        Slot::Positions,
        Slot::Equity,
        Slot::MarketData,
        Slot::OrderBook,
    ];

    /// Whether the slot's content depends on the current selection.
    pub fn is_selection_scoped(&self) -> bool {
        matches!(self, Slot::MarketData | Slot::OrderBook)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Trades => "trades",
            Slot::Positions => "positions",
            Slot::Equity => "equity",
            Slot::MarketData => "market_data",
            Slot::OrderBook => "order_book",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Complete set of dashboard data for one refresh cycle.
///
/// Snapshots are never mutated after publication; every cycle produces a
/// replacement. `stale_slots` lists the slots whose fetch failed in the cycle
/// that produced this snapshot and which therefore carry the previous value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub selection: Selection,
    /// Selection generation the data belongs to
    pub generation: u64,
    pub trades: Vec<Trade>,
    pub positions: Vec<Position>,
    pub equity: Vec<EquityPoint>,
    pub market_data: Vec<MarketBar>,
    pub order_book: OrderBookSnapshot,
    pub stale_slots: Vec<Slot>,
    /// When the cycle was applied. `None` until the first cycle lands.
    pub updated_at: Option<DateTime<Utc>>,
}

impl DashboardSnapshot {
    /// An empty snapshot for a selection that has not been fetched yet.
    pub fn empty(selection: Selection, generation: u64) -> Self {
        Self {
            selection,
            generation,
            trades: Vec::new(),
            positions: Vec::new(),
            equity: Vec::new(),
            market_data: Vec::new(),
            order_book: OrderBookSnapshot::default(),
            stale_slots: Vec::new(),
            updated_at: None,
        }
    }

    /// The snapshot to show after the selection changed.
    ///
    /// Selection-scoped slots are cleared so that data for the old symbol can
    /// never be displayed under the new one. Account-wide slots are kept.
    pub fn invalidated(&self, selection: Selection, generation: u64) -> Self {
        Self {
            selection,
            generation,
            trades: self.trades.clone(),
            positions: self.positions.clone(),
            equity: self.equity.clone(),
            market_data: Vec::new(),
            order_book: OrderBookSnapshot::default(),
            stale_slots: Vec::new(),
            updated_at: self.updated_at,
        }
    }

    /// Whether the slot's last fetch failed.
    pub fn is_stale(&self, slot: Slot) -> bool {
        self.stale_slots.contains(&slot)
    }

    /// Latest equity value, zero when the curve is empty.
    pub fn total_equity(&self) -> Decimal {
        self.equity.last().map(|p| p.equity).unwrap_or(Decimal::ZERO)
    }

    /// Change between the last two equity points.
    pub fn daily_pnl(&self) -> Decimal {
        match self.equity.as_slice() {
            [.., prev, last] => last.equity - prev.equity,
            _ => Decimal::ZERO,
        }
    }

    /// Sum of unrealized P&L across positions.
    pub fn unrealized_pnl(&self) -> Decimal {
        self.positions.iter().map(|p| p.unrealized_pnl).sum()
    }

    /// Sum of realized P&L across reported trades.
    pub fn realized_pnl(&self) -> Decimal {
        self.trades.iter().filter_map(|t| t.pnl).sum()
    }

    /// Latest close of the market bars.
    pub fn last_price(&self) -> Option<f64> {
        self.market_data.last().map(|b| b.close)
    }

    /// Records that break their type's invariant, one line each.
    ///
    /// The backend is trusted for display, so these records are kept and
    /// only reported. Equity points without a cash breakdown are skipped.
    pub fn inconsistencies(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for trade in self.trades.iter().filter(|t| !t.is_valid()) {
            issues.push(format!(
                "trade at {} has negative price or quantity",
                trade.timestamp
            ));
        }

        let tolerance = Decimal::new(1, 2);
        for pos in self.positions.iter().filter(|p| !p.is_pnl_consistent(tolerance)) {
            issues.push(format!(
                "position {} reports P&L {} but its prices imply {}",
                pos.symbol,
                pos.unrealized_pnl,
                pos.expected_unrealized_pnl()
            ));
        }

        for point in self.equity.iter().filter(|p| {
            (p.cash != Decimal::ZERO || p.positions_value != Decimal::ZERO) && !p.is_balanced()
        }) {
            issues.push(format!(
                "equity at {} differs from cash plus positions value",
                point.timestamp
            ));
        }

        for bar in self.market_data.iter().filter(|b| !b.is_consistent()) {
            issues.push(format!("bar at {} has open or close outside low..high", bar.timestamp));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Level, Side};
    use rust_decimal_macros::dec;

    fn populated() -> DashboardSnapshot {
        let mut snapshot = DashboardSnapshot::empty(Selection::default(), 1);
        snapshot.trades = vec![Trade::new(Utc::now(), Side::Sell, dec!(10), dec!(1)).with_pnl(dec!(2.5))];
        snapshot.positions = vec![Position::new("BTC-USDT", dec!(1), dec!(100), dec!(104))];
        snapshot.equity = vec![
            EquityPoint::new(Utc::now(), dec!(1000), dec!(0)),
            EquityPoint::new(Utc::now(), dec!(900), dec!(150)),
        ];
        snapshot.market_data = vec![MarketBar::new(Utc::now(), 1.0, 2.0, 0.5, 1.5, 10.0)];
        snapshot.order_book = OrderBookSnapshot::new(vec![Level(1.0, 1.0)], vec![Level(2.0, 1.0)]);
        snapshot
    }

    #[test]
    fn test_derived_metrics() {
        let snapshot = populated();
        assert_eq!(snapshot.total_equity(), dec!(1050));
        assert_eq!(snapshot.daily_pnl(), dec!(50));
        assert_eq!(snapshot.unrealized_pnl(), dec!(4));
        assert_eq!(snapshot.realized_pnl(), dec!(2.5));
        assert_eq!(snapshot.last_price(), Some(1.5));
    }

    #[test]
    fn test_inconsistencies() {
        let mut snapshot = populated();
        assert!(snapshot.inconsistencies().is_empty());

        snapshot.positions[0].unrealized_pnl = dec!(9);
        snapshot.market_data.push(MarketBar::new(Utc::now(), 3.0, 2.0, 0.5, 1.5, 1.0));
        snapshot.trades.push(Trade::new(Utc::now(), Side::Buy, dec!(10), dec!(-1)));
        snapshot.equity.push(EquityPoint {
            timestamp: Utc::now(),
            equity: dec!(500),
            cash: dec!(0),
            positions_value: dec!(0),
        });

        let issues = snapshot.inconsistencies();
        assert_eq!(issues.len(), 3);
        assert!(issues[0].starts_with("trade at"));
        assert!(issues[1].contains("BTC-USDT reports P&L 9 but its prices imply 4"));
        assert!(issues[2].starts_with("bar at"));

        snapshot.equity[0].cash = dec!(1);
        assert_eq!(snapshot.inconsistencies().len(), 4);
    }

    #[test]
    fn test_daily_pnl_needs_two_points() {
        let mut snapshot = DashboardSnapshot::empty(Selection::default(), 0);
        assert_eq!(snapshot.daily_pnl(), Decimal::ZERO);
        snapshot.equity = vec![EquityPoint::new(Utc::now(), dec!(1000), dec!(0))];
        assert_eq!(snapshot.daily_pnl(), Decimal::ZERO);
        assert_eq!(snapshot.total_equity(), dec!(1000));
    }

    #[test]
    fn test_invalidated_clears_scoped_slots() {
        let snapshot = populated();
        let next = Selection::default().next_symbol();
        let invalidated = snapshot.invalidated(next.clone(), 2);

        assert_eq!(invalidated.selection, next);
        assert_eq!(invalidated.generation, 2);
        assert!(invalidated.market_data.is_empty());
        assert!(invalidated.order_book.is_empty());
        assert_eq!(invalidated.trades, snapshot.trades);
        assert_eq!(invalidated.positions, snapshot.positions);
        assert_eq!(invalidated.equity, snapshot.equity);
    }

    #[test]
    fn test_slot_scoping() {
        let scoped: Vec<Slot> = Slot::ALL
            .iter()
            .copied()
            .filter(Slot::is_selection_scoped)
            .collect();
        assert_eq!(scoped, vec![Slot::MarketData, Slot::OrderBook]);
    }
}
