//! Backtest trigger form and the results the backend returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp::lenient;
use super::{EquityPoint, Interval, ModelLayer, Trade};
use crate::error::ValidationError;

/// Backtest request posted to `/backtest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub symbol: String,
    pub interval: Interval,
    #[serde(with = "lenient")]
    pub start: DateTime<Utc>,
    #[serde(with = "lenient")]
    pub end: DateTime<Utc>,
    pub initial_capital: f64,
    /// Fraction of capital per position
    pub position_size: f64,
    /// Stop loss as a fraction of entry
    pub stop_loss: f64,
    /// Take profit as a fraction of entry
    pub take_profit: f64,
    /// Layers of the model to backtest
    #[serde(default)]
    pub model_config: Vec<ModelLayer>,
}

impl BacktestRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::check_not_empty("symbol", &self.symbol)?;
        if self.start >= self.end {
            return Err(ValidationError::Invalid {
                field: "period",
                reason: format!("start {} is not before end {}", self.start, self.end),
            });
        }
        ValidationError::check_min("initial_capital", self.initial_capital, 1000.0)?;
        ValidationError::check_range("position_size", self.position_size, 0.1, 1.0)?;
        ValidationError::check_range("stop_loss", self.stop_loss, 0.01, 0.1)?;
        ValidationError::check_range("take_profit", self.take_profit, 0.01, 0.2)?;
        self.model_config.iter().try_for_each(ModelLayer::validate)
    }
}

/// Backtest outcome. Ratios are fractions (0.12 = 12%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub total_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    #[serde(default)]
    pub equity_curve: Vec<EquityPoint>,
    #[serde(default)]
    pub trades: Vec<Trade>,
}

impl BacktestResult {
    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                    BACKTEST RESULTS                       \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str(&format!(
            "  Total Return:        {:.2}%\n",
            self.total_return * 100.0
        ));
        s.push_str(&format!("  Sharpe Ratio:        {:.2}\n", self.sharpe_ratio));
        s.push_str(&format!(
            "  Max Drawdown:        {:.2}%\n",
            self.max_drawdown * 100.0
        ));
        s.push_str(&format!("  Win Rate:            {:.2}%\n", self.win_rate * 100.0));
        s.push_str(&format!("  Trades:              {}\n", self.trades.len()));
        s.push_str(&format!(
            "  Equity Points:       {}\n",
            self.equity_curve.len()
        ));
        s.push('\n');
        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request() -> BacktestRequest {
        let end = Utc::now();
        BacktestRequest {
            symbol: "BTCUSDT".to_string(),
            interval: Interval::Minute5,
            start: end - Duration::days(30),
            end,
            initial_capital: 10000.0,
            position_size: 0.5,
            stop_loss: 0.02,
            take_profit: 0.05,
            model_config: vec![],
        }
    }

    #[test]
    fn test_backtest_request_bounds() {
        assert!(request().validate().is_ok());

        let mut req = request();
        req.initial_capital = 500.0;
        assert!(matches!(
            req.validate(),
            Err(ValidationError::BelowMinimum { field: "initial_capital", .. })
        ));

        let mut req = request();
        req.take_profit = 0.3;
        assert!(req.validate().is_err());

        let mut req = request();
        req.start = req.end;
        assert!(matches!(
            req.validate(),
            Err(ValidationError::Invalid { field: "period", .. })
        ));
    }

    #[test]
    fn test_result_summary() {
        let result = BacktestResult {
            total_return: 0.1,
            sharpe_ratio: 1.25,
            max_drawdown: 0.05,
            win_rate: 0.6,
            ..Default::default()
        };

        let summary = result.summary();
        assert!(summary.contains("Total Return"));
        assert!(summary.contains("10.00%"));
        assert!(summary.contains("60.00%"));
    }
}
