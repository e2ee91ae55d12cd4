//! TUI Dashboard using ratatui.

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dashboard_core::types::{BookSide, DashboardSnapshot, OrderBookRow, Side, Slot};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame, Terminal,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// What the TUI shows on one frame.
pub struct DashboardState {
    pub snapshot: Arc<DashboardSnapshot>,
    pub polling: bool,
    /// Backend the data comes from
    pub source: String,
    /// Most recent last
    pub messages: Vec<String>,
}

/// User input mapped to dashboard commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextExchange,
    NextSymbol,
    NextInterval,
    Refresh,
    TogglePolling,
}

impl Action {
    pub fn from_key(code: KeyCode) -> Option<Action> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('e') => Some(Action::NextExchange),
            KeyCode::Char('s') => Some(Action::NextSymbol),
            KeyCode::Char('i') => Some(Action::NextInterval),
            KeyCode::Char('r') => Some(Action::Refresh),
            KeyCode::Char('p') => Some(Action::TogglePolling),
            _ => None,
        }
    }
}

const KEY_HELP: &str = " q quit | e exchange | s symbol | i interval | r refresh | p pause ";

/// TUI Dashboard.
pub struct Dashboard {
    tick_ms: u64,
}

impl Dashboard {
    /// Create a new dashboard redrawing every `tick_ms`.
    pub fn new(tick_ms: u64) -> Self {
        Self { tick_ms }
    }

    /// Run the dashboard until the user quits.
    ///
    /// `get_state` is called before every frame. Every action other than
    /// `Quit` is handed to `on_action`.
    pub fn run<S, H>(&self, mut get_state: S, mut on_action: H) -> io::Result<()>
    where
        S: FnMut() -> DashboardState,
        H: FnMut(Action),
    {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_loop(&mut terminal, &mut get_state, &mut on_action);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        res
    }

    fn run_loop<B, S, H>(
        &self,
        terminal: &mut Terminal<B>,
        get_state: &mut S,
        on_action: &mut H,
    ) -> io::Result<()>
    where
        B: Backend,
        S: FnMut() -> DashboardState,
        H: FnMut(Action),
    {
        loop {
            let state = get_state();
            terminal.draw(|f| self.ui(f, &state))?;

            if event::poll(Duration::from_millis(self.tick_ms))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match Action::from_key(key.code) {
                        Some(Action::Quit) => return Ok(()),
                        Some(action) => on_action(action),
                        None => {}
                    }
                }
            }
        }
    }

    fn ui(&self, frame: &mut Frame, state: &DashboardState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),  // Header
                Constraint::Length(4),  // Stats
                Constraint::Min(8),     // Charts
                Constraint::Min(10),    // Tables
                Constraint::Length(7),  // Log
            ])
            .split(frame.area());

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);

        let tables = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(35),
                Constraint::Percentage(35),
                Constraint::Percentage(30),
            ])
            .split(chunks[3]);

        self.render_header(frame, chunks[0], state);
        self.render_stats(frame, chunks[1], &state.snapshot);
        self.render_equity_chart(frame, charts[0], &state.snapshot);
        self.render_price_chart(frame, charts[1], &state.snapshot);
        self.render_positions(frame, tables[0], &state.snapshot);
        self.render_trades(frame, tables[1], &state.snapshot);
        self.render_order_book(frame, tables[2], &state.snapshot);
        self.render_messages(frame, chunks[4], state);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let snapshot = &state.snapshot;
        let (status, status_color) = if state.polling {
            ("POLLING", Color::Green)
        } else {
            ("IDLE", Color::Yellow)
        };
        let updated = snapshot
            .updated_at
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());

        let header = Paragraph::new(vec![Line::from(vec![
            Span::styled(
                "Trading Dashboard",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::styled(
                snapshot.selection.to_string(),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(" | "),
            Span::styled(status, Style::default().fg(status_color)),
            Span::raw(format!(
                " | gen {} | updated {} | {}",
                snapshot.generation, updated, state.source
            )),
        ])])
        .block(Block::default().borders(Borders::ALL).title("System"));
        frame.render_widget(header, area);
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
        let daily_pnl = snapshot.daily_pnl();
        let unrealized = snapshot.unrealized_pnl();
        let last_price = snapshot
            .last_price()
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| "-".to_string());
        let spread = snapshot
            .order_book
            .spread()
            .map(|s| format!("{:.4}", s))
            .unwrap_or_else(|| "-".to_string());

        let stats = Paragraph::new(vec![
            Line::from(vec![
                Span::raw("Equity: "),
                Span::styled(
                    format!("${:.2}", snapshot.total_equity()),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  |  Daily P&L: "),
                Span::styled(format!("${:.2}", daily_pnl), pnl_style(daily_pnl)),
                Span::raw("  |  Unrealized: "),
                Span::styled(format!("${:.2}", unrealized), pnl_style(unrealized)),
                Span::raw(format!("  |  Realized: ${:.2}", snapshot.realized_pnl())),
            ]),
            Line::from(vec![
                Span::raw(format!("Positions: {}", snapshot.positions.len())),
                Span::raw(format!("  |  Trades: {}", snapshot.trades.len())),
                Span::raw(format!("  |  Last: {}", last_price)),
                Span::raw(format!("  |  Spread: {}", spread)),
            ]),
        ])
        .block(Block::default().borders(Borders::ALL).title("Statistics"));
        frame.render_widget(stats, area);
    }

    fn render_equity_chart(&self, frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
        let points: Vec<(f64, f64)> = snapshot
            .equity
            .iter()
            .enumerate()
            .filter_map(|(i, p)| Some((i as f64, p.equity.to_f64()?)))
            .collect();
        let title = slot_title("Equity Curve", snapshot, Slot::Equity);
        frame.render_widget(line_chart(title, "equity", &points, Color::Green), area);
    }

    fn render_price_chart(&self, frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
        let points: Vec<(f64, f64)> = snapshot
            .market_data
            .iter()
            .enumerate()
            .map(|(i, bar)| (i as f64, bar.close))
            .collect();
        let title = slot_title(
            &format!("{} {}", snapshot.selection.symbol(), snapshot.selection.interval()),
            snapshot,
            Slot::MarketData,
        );
        frame.render_widget(line_chart(title, "close", &points, Color::Cyan), area);
    }

    fn render_positions(&self, frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
        let header = header_row(&["Symbol", "Qty", "Entry", "Current", "P&L"]);

        let rows = snapshot.positions.iter().map(|pos| {
            Row::new(vec![
                Cell::from(pos.symbol.clone()),
                Cell::from(format!("{}", pos.quantity)),
                Cell::from(format!("{:.2}", pos.entry_price)),
                Cell::from(format!("{:.2}", pos.current_price)),
                Cell::from(format!("{:.2}", pos.unrealized_pnl)).style(pnl_style(pos.unrealized_pnl)),
            ])
        });

        let table = Table::new(rows, [Constraint::Ratio(1, 5); 5])
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(slot_title("Positions", snapshot, Slot::Positions)),
            );
        frame.render_widget(table, area);
    }

    fn render_trades(&self, frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
        let header = header_row(&["Time", "Side", "Price", "Qty", "P&L"]);

        let rows = snapshot.trades.iter().rev().map(|trade| {
            let side_color = match trade.side {
                Side::Buy => Color::Green,
                Side::Sell => Color::Red,
            };
            let pnl = match trade.pnl {
                Some(pnl) => Cell::from(format!("{:.2}", pnl)).style(pnl_style(pnl)),
                None => Cell::from("-"),
            };

            Row::new(vec![
                Cell::from(trade.timestamp.format("%H:%M:%S").to_string()),
                Cell::from(trade.side.to_string()).style(Style::default().fg(side_color)),
                Cell::from(format!("{:.2}", trade.price)),
                Cell::from(format!("{}", trade.quantity)),
                pnl,
            ])
        });

        let table = Table::new(rows, [Constraint::Ratio(1, 5); 5])
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(slot_title("Trades", snapshot, Slot::Trades)),
            );
        frame.render_widget(table, area);
    }

    fn render_order_book(&self, frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
        let header = header_row(&["Price", "Amount", "Total"]);
        // Borders and header take three lines.
        let depth = (area.height.saturating_sub(3) / 2) as usize;
        let rows = visible_depth(&snapshot.order_book.depth_rows(), depth)
            .into_iter()
            .map(|row| {
                let color = match row.side {
                    BookSide::Ask => Color::Red,
                    BookSide::Bid => Color::Green,
                };
                Row::new(vec![
                    Cell::from(format!("{:.2}", row.price)),
                    Cell::from(format!("{:.4}", row.amount)),
                    Cell::from(format!("{:.4}", row.total)),
                ])
                .style(Style::default().fg(color))
            });

        let table = Table::new(rows, [Constraint::Ratio(1, 3); 3])
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(slot_title("Order Book", snapshot, Slot::OrderBook)),
            );
        frame.render_widget(table, area);
    }

    fn render_messages(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let warn = Style::default().fg(Color::Yellow);
        let mut lines: Vec<Line> = state
            .snapshot
            .stale_slots
            .iter()
            .map(|slot| {
                Line::from(Span::styled(
                    format!("{} fetch failed, showing previous data", slot),
                    warn,
                ))
            })
            .collect();

        let room = (area.height.saturating_sub(2) as usize).saturating_sub(lines.len());
        lines.extend(
            state
                .messages
                .iter()
                .rev()
                .take(room)
                .map(|m| Line::from(m.as_str())),
        );

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Log")
                .title_bottom(KEY_HELP),
        );
        frame.render_widget(paragraph, area);
    }
}

/// The asks nearest the spread followed by the best bids, at most `depth` each.
fn visible_depth(rows: &[OrderBookRow], depth: usize) -> Vec<OrderBookRow> {
    let asks: Vec<OrderBookRow> = rows
        .iter()
        .filter(|r| r.side == BookSide::Ask)
        .copied()
        .collect();
    let skip = asks.len().saturating_sub(depth);

    asks.into_iter()
        .skip(skip)
        .chain(
            rows.iter()
                .filter(|r| r.side == BookSide::Bid)
                .take(depth)
                .copied(),
        )
        .collect()
}

fn slot_title(name: &str, snapshot: &DashboardSnapshot, slot: Slot) -> String {
    if snapshot.is_stale(slot) {
        format!("{} (stale)", name)
    } else {
        name.to_string()
    }
}

fn header_row<'a>(titles: &[&'a str]) -> Row<'a> {
    Row::new(
        titles
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD))),
    )
    .height(1)
}

fn pnl_style(value: Decimal) -> Style {
    if value >= Decimal::ZERO {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    }
}

fn line_chart<'a>(title: String, name: &'a str, points: &'a [(f64, f64)], color: Color) -> Chart<'a> {
    let x_max = (points.len().max(2) - 1) as f64;
    let (lo, hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, y)| {
            (lo.min(*y), hi.max(*y))
        });
    let (lo, hi) = if lo.is_finite() && hi.is_finite() {
        let pad = ((hi - lo) * 0.05).max(hi.abs() * 0.001).max(f64::EPSILON);
        (lo - pad, hi + pad)
    } else {
        (0.0, 1.0)
    };

    let dataset = Dataset::default()
        .name(name)
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(points);

    Chart::new(vec![dataset])
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_axis(Axis::default().bounds([0.0, x_max]))
        .y_axis(
            Axis::default()
                .bounds([lo, hi])
                .labels(vec![format!("{:.2}", lo), format!("{:.2}", hi)]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dashboard_core::types::{EquityPoint, Level, MarketBar, OrderBookSnapshot, Position, Selection, Trade};
    use ratatui::backend::TestBackend;
    use rust_decimal_macros::dec;

    fn state() -> DashboardState {
        let mut snapshot = DashboardSnapshot::empty(Selection::default(), 3);
        snapshot.positions = vec![Position::new("BTC-USDT", dec!(0.5), dec!(60000), dec!(61000))];
        snapshot.trades = vec![Trade::new(Utc::now(), Side::Sell, dec!(61000), dec!(0.1)).with_pnl(dec!(-12.5))];
        snapshot.equity = vec![
            EquityPoint::new(Utc::now(), dec!(10000), dec!(0)),
            EquityPoint::new(Utc::now(), dec!(9000), dec!(1500)),
        ];
        snapshot.market_data = (0..20)
            .map(|i| {
                let p = 60000.0 + i as f64;
                MarketBar::new(Utc::now(), p, p + 1.0, p - 1.0, p, 1.0)
            })
            .collect();
        snapshot.order_book = OrderBookSnapshot::new(
            vec![Level(100.0, 1.0), Level(99.0, 2.0)],
            vec![Level(101.0, 1.0), Level(102.0, 2.0)],
        );
        snapshot.stale_slots = vec![Slot::Positions];

        DashboardState {
            snapshot: Arc::new(snapshot),
            polling: true,
            source: "http://localhost:8000".to_string(),
            messages: vec!["Selection changed to okx:BTC-USDT@1m".to_string()],
        }
    }

    fn render(state: &DashboardState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 48)).unwrap();
        let dashboard = Dashboard::new(250);
        terminal.draw(|f| dashboard.ui(f, state)).unwrap();

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_renders_snapshot() {
        let screen = render(&state());

        assert!(screen.contains("okx:BTC-USDT@1m"));
        assert!(screen.contains("POLLING"));
        assert!(screen.contains("gen 3"));
        assert!(screen.contains("$10500.00"));
        assert!(screen.contains("Positions (stale)"));
        assert!(screen.contains("positions fetch failed"));
        assert!(screen.contains("-12.50"));
        assert!(screen.contains("102.00"));
    }

    #[test]
    fn test_renders_empty_snapshot() {
        let state = DashboardState {
            snapshot: Arc::new(DashboardSnapshot::empty(Selection::default(), 0)),
            polling: false,
            source: "fake".to_string(),
            messages: Vec::new(),
        };
        let screen = render(&state);
        assert!(screen.contains("IDLE"));
        assert!(screen.contains("updated never"));
    }

    #[test]
    fn test_visible_depth_keeps_rows_near_spread() {
        let book = OrderBookSnapshot::new(
            vec![Level(100.0, 1.0), Level(99.0, 2.0), Level(98.0, 3.0)],
            vec![Level(101.0, 1.0), Level(102.0, 2.0), Level(103.0, 3.0)],
        );
        let rows = visible_depth(&book.depth_rows(), 2);

        let prices: Vec<f64> = rows.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![102.0, 101.0, 100.0, 99.0]);
        assert_eq!(rows[0].side, BookSide::Ask);
        assert_eq!(rows[3].side, BookSide::Bid);
        // Totals are accumulated over the whole side, not just the visible rows.
        assert_eq!(rows[0].total, 5.0);
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(Action::from_key(KeyCode::Char('q')), Some(Action::Quit));
        assert_eq!(Action::from_key(KeyCode::Esc), Some(Action::Quit));
        assert_eq!(Action::from_key(KeyCode::Char('s')), Some(Action::NextSymbol));
        assert_eq!(Action::from_key(KeyCode::Char('p')), Some(Action::TogglePolling));
        assert_eq!(Action::from_key(KeyCode::Char('x')), None);
    }
}
