//! Lenient timestamp decoding.
//!
//! The backend emits timestamps in whatever shape its data layer produced:
//! RFC 3339 strings, naive ISO-8601 strings without an offset, or Unix
//! milliseconds. Everything is normalized to `DateTime<Utc>`; naive values
//! are taken to be UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a timestamp string in any of the accepted shapes.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    raw.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Float(f64),
    Text(String),
}

impl RawTimestamp {
    fn resolve<E: serde::de::Error>(self) -> Result<DateTime<Utc>, E> {
        match self {
            RawTimestamp::Millis(ms) => DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| E::custom(format!("timestamp out of range: {ms}"))),
            RawTimestamp::Float(ms) => DateTime::from_timestamp_millis(ms as i64)
                .ok_or_else(|| E::custom(format!("timestamp out of range: {ms}"))),
            RawTimestamp::Text(s) => {
                parse_timestamp(&s).ok_or_else(|| E::custom(format!("invalid timestamp: {s}")))
            }
        }
    }
}

/// `#[serde(with = "lenient")]` for required timestamps.
pub mod lenient {
    use super::*;

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawTimestamp::deserialize(deserializer)?.resolve()
    }
}

/// `#[serde(with = "lenient_option")]` for optional timestamps.
pub mod lenient_option {
    use super::*;

    pub fn serialize<S>(ts: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match ts {
            Some(ts) => serializer.serialize_some(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<RawTimestamp>::deserialize(deserializer)? {
            Some(raw) => raw.resolve().map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();

        assert_eq!(parse_timestamp("2024-03-01T12:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T20:30:00+08:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T12:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01 12:30:00.000"), Some(expected));
        assert_eq!(
            parse_timestamp(&expected.timestamp_millis().to_string()),
            Some(expected)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_deserialize_number_and_text() {
        #[derive(Deserialize)]
        struct Stamped {
            #[serde(with = "lenient")]
            ts: DateTime<Utc>,
        }

        let a: Stamped = serde_json::from_str(r#"{"ts": 1709296200000}"#).unwrap();
        let b: Stamped = serde_json::from_str(r#"{"ts": "2024-03-01T12:30:00"}"#).unwrap();
        assert_eq!(a.ts, b.ts);
        assert!(serde_json::from_str::<Stamped>(r#"{"ts": "not a time"}"#).is_err());
    }
}
