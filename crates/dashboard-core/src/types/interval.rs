//! Candle intervals offered by the market-data endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interval for market bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Interval {
    /// 1 minute bars
    #[serde(rename = "1m")]
    #[default]
    Minute1,
    /// 5 minute bars
    #[serde(rename = "5m")]
    Minute5,
    /// 15 minute bars
    #[serde(rename = "15m")]
    Minute15,
    /// 1 hour bars
    #[serde(rename = "1h")]
    Hour1,
    /// 4 hour bars
    #[serde(rename = "4h")]
    Hour4,
    /// Daily bars
    #[serde(rename = "1d")]
    Daily,
}

impl Interval {
    /// Get the duration of the interval in seconds.
    pub fn as_secs(&self) -> u64 {
        match self {
            Interval::Minute1 => 60,
            Interval::Minute5 => 300,
            Interval::Minute15 => 900,
            Interval::Hour1 => 3600,
            Interval::Hour4 => 14400,
            Interval::Daily => 86400,
        }
    }

    /// Wire representation, as used in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute1 => "1m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Hour1 => "1h",
            Interval::Hour4 => "4h",
            Interval::Daily => "1d",
        }
    }

    /// Get all available intervals.
    pub fn all() -> &'static [Interval] {
        &[
            Interval::Minute1,
            Interval::Minute5,
            Interval::Minute15,
            Interval::Hour1,
            Interval::Hour4,
            Interval::Daily,
        ]
    }

    /// The next interval in selector order, wrapping around.
    pub fn next(&self) -> Interval {
        let all = Self::all();
        let idx = all.iter().position(|i| i == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1m" | "1min" | "minute" => Ok(Interval::Minute1),
            "5m" | "5min" => Ok(Interval::Minute5),
            "15m" | "15min" => Ok(Interval::Minute15),
            "1h" | "1hour" | "hour" => Ok(Interval::Hour1),
            "4h" | "4hour" => Ok(Interval::Hour4),
            "1d" | "day" | "daily" => Ok(Interval::Daily),
            _ => Err(format!("Invalid interval: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_duration() {
        assert_eq!(Interval::Minute1.as_secs(), 60);
        assert_eq!(Interval::Hour4.as_secs(), 14400);
        assert_eq!(Interval::Daily.as_secs(), 86400);
    }

    #[test]
    fn test_interval_parse_and_display() {
        assert_eq!(Interval::from_str("15m").unwrap(), Interval::Minute15);
        assert_eq!(Interval::from_str("daily").unwrap(), Interval::Daily);
        assert!(Interval::from_str("30m").is_err());
        assert_eq!(Interval::Hour1.to_string(), "1h");
    }

    #[test]
    fn test_interval_cycles() {
        assert_eq!(Interval::Minute1.next(), Interval::Minute5);
        assert_eq!(Interval::Daily.next(), Interval::Minute1);
    }

    #[test]
    fn test_interval_serde() {
        assert_eq!(serde_json::to_string(&Interval::Hour4).unwrap(), "\"4h\"");
        let parsed: Interval = serde_json::from_str("\"5m\"").unwrap();
        assert_eq!(parsed, Interval::Minute5);
    }
}
