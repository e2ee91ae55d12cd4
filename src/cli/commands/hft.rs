//! HFT loop control commands.

use anyhow::Result;
use dashboard_config::AppConfig;
use dashboard_core::types::HftStatus;

use crate::cli::{HftCommand, HftStartArgs};

pub async fn run(command: HftCommand, config: &AppConfig) -> Result<()> {
    let client = super::client(config)?;

    match command {
        HftCommand::Start(args) => {
            let params = start_params(&args, config);
            params.validate()?;
            let ack = client.start_hft(&params).await?;
            println!("{}", ack.describe());
        }
        HftCommand::Stop { symbol } => {
            let ack = client.stop_hft(&symbol).await?;
            println!("{}", ack.describe());
        }
        HftCommand::Status { symbol } => {
            let status = client.hft_status(&symbol).await?;
            println!("{}", format_status(&status));
        }
    }

    Ok(())
}

/// Configured defaults overridden by the given flags.
fn start_params(args: &HftStartArgs, config: &AppConfig) -> dashboard_core::types::HftParams {
    let exchange = args.exchange.unwrap_or(config.selection.exchange);
    let mut params = config.hft.params(&args.symbol, exchange);
    if let Some(v) = args.tick_interval {
        params.tick_interval = v;
    }
    if let Some(v) = args.position_limit {
        params.position_limit = v;
    }
    if let Some(v) = args.min_spread {
        params.min_spread = v;
    }
    if let Some(v) = args.min_profit {
        params.min_profit = v;
    }
    params
}

fn format_status(status: &HftStatus) -> String {
    format!(
        "HFT {} | symbol: {} | position: {:.4} | trades: {} | P&L: {:.2}",
        if status.running { "running" } else { "stopped" },
        if status.symbol.is_empty() { "-" } else { &status.symbol },
        status.position,
        status.trades_count,
        status.pnl
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::types::Exchange;

    #[test]
    fn test_start_params_override_config() {
        let config = AppConfig::default();
        let args = HftStartArgs {
            symbol: "ETHUSDT".to_string(),
            exchange: Some(Exchange::Binance),
            tick_interval: None,
            position_limit: Some(0.5),
            min_spread: None,
            min_profit: None,
        };

        let params = start_params(&args, &config);
        assert_eq!(params.exchange, Exchange::Binance);
        assert_eq!(params.position_limit, 0.5);
        assert_eq!(params.tick_interval, config.hft.tick_interval);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_format_status() {
        let status = HftStatus {
            running: true,
            symbol: "BTC-USDT".to_string(),
            position: 0.25,
            trades_count: 42,
            pnl: -3.5,
        };
        assert_eq!(
            format_status(&status),
            "HFT running | symbol: BTC-USDT | position: 0.2500 | trades: 42 | P&L: -3.50"
        );
    }
}
