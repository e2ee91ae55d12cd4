//! Backtest command implementation.

use anyhow::Result;
use dashboard_config::AppConfig;
use dashboard_core::types::{BacktestRequest, ModelLayer};
use tracing::info;

use crate::cli::{BacktestArgs, OutputFormat};

pub async fn run(args: BacktestArgs, config: &AppConfig) -> Result<()> {
    let model_config: Vec<ModelLayer> = match &args.model {
        Some(path) => super::read_json(path)?,
        None => Vec::new(),
    };

    let request = BacktestRequest {
        symbol: args.symbol,
        interval: args.interval,
        start: args.start,
        end: args.end,
        initial_capital: args.capital,
        position_size: args.position_size,
        stop_loss: args.stop_loss,
        take_profit: args.take_profit,
        model_config,
    };
    request.validate()?;

    info!(
        "Starting backtest for {} {} from {} to {}",
        request.symbol, request.interval, request.start, request.end
    );
    let report = super::client(config)?.run_backtest(&request).await?;

    // Output results
    match args.output {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => println!("{}", report.summary()),
    }

    // Save if requested
    if let Some(save_path) = &args.save {
        std::fs::write(save_path, report.to_json()?)?;
        info!("Results saved to {:?}", save_path);
    }

    Ok(())
}
