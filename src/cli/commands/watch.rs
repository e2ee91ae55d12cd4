//! Live dashboard command.

use anyhow::Result;
use dashboard_config::AppConfig;
use dashboard_core::types::DashboardSnapshot;
use dashboard_data::{spawn_poller, Poller, PollerState};
use dashboard_monitor::{Action, Dashboard, DashboardState};
use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::cli::WatchArgs;

const MAX_MESSAGES: usize = 50;

pub async fn run(args: WatchArgs, config: &AppConfig) -> Result<()> {
    let selection = args.selection.resolve(&config.selection)?;
    let period = args
        .poll_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.polling.period());
    let client = Arc::new(super::client(config)?);

    info!("Watching {} every {:?}", selection, period);
    let poller = Arc::new(spawn_poller(
        client,
        selection,
        config.polling.market_data_limit,
        period,
    ));

    if args.headless {
        headless(&poller).await
    } else {
        tui(Arc::clone(&poller), period, config.monitor.tick_ms).await?;
        poller.stop();
        Ok(())
    }
}

/// Print one line per published snapshot until Ctrl-C.
async fn headless(poller: &Poller) -> Result<()> {
    let mut rx = poller.aggregator().subscribe();

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                println!("{}", summary_line(&snapshot));
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                break;
            }
        }
    }

    poller.stop();
    Ok(())
}

/// The TUI blocks on terminal input, so it runs on the blocking pool.
async fn tui(poller: Arc<Poller>, period: Duration, tick_ms: u64) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        let dashboard = Dashboard::new(tick_ms);
        let messages = RefCell::new(Vec::new());

        dashboard.run(
            || DashboardState {
                snapshot: poller.aggregator().snapshot(),
                polling: poller.state() == PollerState::Polling,
                source: poller.aggregator().api_name().to_string(),
                messages: messages.borrow().clone(),
            },
            |action| {
                let message = handle_action(&poller, action, period);
                let mut messages = messages.borrow_mut();
                messages.push(message);
                if messages.len() > MAX_MESSAGES {
                    messages.remove(0);
                }
            },
        )
    })
    .await??;

    Ok(())
}

fn handle_action(poller: &Poller, action: Action, period: Duration) -> String {
    let current = poller.aggregator().selection();
    let next = match action {
        Action::NextExchange => current.next_exchange(),
        Action::NextSymbol => current.next_symbol(),
        Action::NextInterval => current.next_interval(),
        Action::Refresh => {
            poller.refresh_now();
            return "Refresh requested".to_string();
        }
        Action::TogglePolling => {
            return if poller.state() == PollerState::Polling {
                poller.stop();
                "Polling paused".to_string()
            } else {
                poller.start(period);
                "Polling resumed".to_string()
            };
        }
        Action::Quit => return String::new(),
    };

    poller.on_params_change(&next);
    format!("Selection changed to {}", next)
}

fn summary_line(snapshot: &DashboardSnapshot) -> String {
    let mut line = format!(
        "{} gen {} | equity ${:.2} | daily ${:.2} | positions {} | trades {} | last {}",
        snapshot.selection,
        snapshot.generation,
        snapshot.total_equity(),
        snapshot.daily_pnl(),
        snapshot.positions.len(),
        snapshot.trades.len(),
        snapshot
            .last_price()
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| "-".to_string()),
    );
    if !snapshot.stale_slots.is_empty() {
        let stale: Vec<&str> = snapshot.stale_slots.iter().map(|s| s.as_str()).collect();
        line.push_str(&format!(" | stale: {}", stale.join(",")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::types::{Selection, Slot};

    #[test]
    fn test_summary_line() {
        let mut snapshot = DashboardSnapshot::empty(Selection::default(), 2);
        assert_eq!(
            summary_line(&snapshot),
            "okx:BTC-USDT@1m gen 2 | equity $0.00 | daily $0.00 | positions 0 | trades 0 | last -"
        );

        snapshot.stale_slots = vec![Slot::Trades, Slot::OrderBook];
        assert!(summary_line(&snapshot).ends_with("| stale: trades,order_book"));
    }
}
