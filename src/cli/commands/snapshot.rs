//! One-shot snapshot command.

use anyhow::{bail, Result};
use dashboard_config::AppConfig;
use dashboard_core::types::{DashboardSnapshot, Slot, TechnicalIndicators};
use dashboard_data::Aggregator;
use std::fmt::Write;
use std::sync::Arc;
use tracing::warn;

use crate::cli::{OutputFormat, SnapshotArgs};

pub async fn run(args: SnapshotArgs, config: &AppConfig) -> Result<()> {
    let selection = args.selection.resolve(&config.selection)?;
    let client = Arc::new(super::client(config)?);
    let limit = config.polling.market_data_limit;
    let aggregator = Aggregator::new(client.clone(), selection.clone(), limit);

    let indicators = async {
        if !args.indicators {
            return None;
        }
        match client
            .technical_indicators(selection.symbol(), selection.interval(), limit)
            .await
        {
            Ok(rows) => Some(rows),
            Err(e) => {
                warn!("Technical indicators could not be fetched: {}", e);
                None
            }
        }
    };
    let (snapshot, indicators) = tokio::join!(aggregator.refresh_current(), indicators);

    if snapshot.stale_slots.len() == Slot::ALL.len() {
        bail!("Backend at {} is unreachable: every fetch failed", config.api.base_url);
    }
    for slot in &snapshot.stale_slots {
        warn!("{} could not be fetched", slot);
    }

    match (args.output, &indicators) {
        (OutputFormat::Json, None) => println!("{}", serde_json::to_string_pretty(&*snapshot)?),
        (OutputFormat::Json, Some(rows)) => {
            let body = serde_json::json!({ "snapshot": &*snapshot, "indicators": rows });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        (OutputFormat::Text, _) => {
            print!("{}", render_text(&snapshot));
            if let Some(rows) = &indicators {
                print!("{}", render_indicators(rows));
            }
        }
    }

    Ok(())
}

/// Plain-text rendering of a snapshot.
pub fn render_text(snapshot: &DashboardSnapshot) -> String {
    let mut s = String::new();
    let stale = |slot: Slot| if snapshot.is_stale(slot) { " (stale)" } else { "" };

    let _ = writeln!(s, "═══════════════════════════════════════════════════════════");
    let _ = writeln!(s, "  {}", snapshot.selection);
    let _ = writeln!(s, "═══════════════════════════════════════════════════════════");
    let _ = writeln!(s, "  Equity:              ${:.2}{}", snapshot.total_equity(), stale(Slot::Equity));
    let _ = writeln!(s, "  Daily P&L:           ${:.2}", snapshot.daily_pnl());
    let _ = writeln!(s, "  Unrealized P&L:      ${:.2}", snapshot.unrealized_pnl());
    let _ = writeln!(s, "  Realized P&L:        ${:.2}", snapshot.realized_pnl());
    match snapshot.last_price() {
        Some(price) => {
            let _ = writeln!(s, "  Last price:          {:.2}{}", price, stale(Slot::MarketData));
        }
        None => {
            let _ = writeln!(s, "  Last price:          -{}", stale(Slot::MarketData));
        }
    }

    let _ = writeln!(s, "\nPositions{}", stale(Slot::Positions));
    for p in &snapshot.positions {
        let _ = writeln!(
            s,
            "  {:<12} qty {:>10}  entry {:>12.2}  current {:>12.2}  P&L {:>10.2}",
            p.symbol, p.quantity, p.entry_price, p.current_price, p.unrealized_pnl
        );
    }

    let _ = writeln!(s, "\nRecent trades{}", stale(Slot::Trades));
    for t in snapshot.trades.iter().rev().take(10) {
        let pnl = t.pnl.map(|p| format!("{:.2}", p)).unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            s,
            "  {}  {:<4} {:>12.2} x {:<10} P&L {}",
            t.timestamp.format("%Y-%m-%d %H:%M:%S"),
            t.side,
            t.price,
            t.quantity,
            pnl
        );
    }

    let _ = writeln!(s, "\nOrder book{}", stale(Slot::OrderBook));
    for row in snapshot.order_book.depth_rows() {
        let _ = writeln!(
            s,
            "  {:<4} {:>12.2} {:>12.4} {:>12.4}",
            format!("{:?}", row.side).to_lowercase(),
            row.price,
            row.amount,
            row.total
        );
    }

    s
}

/// Latest indicator row, or a placeholder when the backend has none yet.
pub fn render_indicators(rows: &[TechnicalIndicators]) -> String {
    let value = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string());

    let mut s = String::new();
    let Some(latest) = rows.last() else {
        let _ = writeln!(s, "\nIndicators\n  none available");
        return s;
    };

    let _ = writeln!(s, "\nIndicators (latest of {})", rows.len());
    let _ = writeln!(
        s,
        "  MA20 {}  MA50 {}  RSI14 {}",
        value(latest.ma_20),
        value(latest.ma_50),
        value(latest.rsi_14)
    );
    let _ = writeln!(
        s,
        "  MACD {}  signal {}  hist {}",
        value(latest.macd),
        value(latest.macd_signal),
        value(latest.macd_hist)
    );
    s
}
