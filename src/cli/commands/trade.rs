//! Manual trade command.

use anyhow::Result;
use dashboard_config::AppConfig;
use dashboard_core::types::TradeRequest;
use tracing::info;

use crate::cli::TradeArgs;

pub async fn run(args: TradeArgs, config: &AppConfig) -> Result<()> {
    let request = TradeRequest {
        symbol: args.symbol,
        order_type: args.order_type,
        side: args.side,
        quantity: args.quantity,
        price: args.price,
    };
    request.validate()?;

    info!("Submitting {} {} order for {}", request.order_type, request.side, request.symbol);
    let ack = super::client(config)?.place_trade(&request).await?;
    println!("{}", ack.describe());

    Ok(())
}
