//! Error types for the dashboard client.

use thiserror::Error;

/// Errors raised while talking to the backend API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed payload: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),
}

impl ApiError {
    /// Whether retrying the same request may succeed.
    ///
    /// Connection failures, timeouts, rate limiting and server-side errors are
    /// transient. Client errors, bad payloads and invalid requests are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) | ApiError::Timeout(_) => true,
            ApiError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            ApiError::Configuration(_) | ApiError::Decode(_) | ApiError::InvalidRequest(_) => false,
        }
    }
}

/// Form validation errors, raised before any request leaves the client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        min: f64,
        value: f64,
    },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{field} is required for {context}")]
    Missing {
        field: &'static str,
        context: &'static str,
    },

    #[error("{field} is not allowed for {context}")]
    NotAllowed {
        field: &'static str,
        context: &'static str,
    },

    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    /// Check `value >= min`.
    pub fn check_min(field: &'static str, value: f64, min: f64) -> Result<(), ValidationError> {
        if value.is_finite() && value >= min {
            Ok(())
        } else {
            Err(ValidationError::BelowMinimum { field, min, value })
        }
    }

    /// Check `min <= value <= max`.
    pub fn check_range(
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<(), ValidationError> {
        if value.is_finite() && value >= min && value <= max {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                field,
                min,
                max,
                value,
            })
        }
    }

    /// Check that a text field is not blank.
    pub fn check_not_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::Empty { field })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ApiError::Network("reset".into()).is_transient());
        assert!(ApiError::Timeout("10s".into()).is_transient());
        assert!(ApiError::Status { status: 503, body: String::new() }.is_transient());
        assert!(ApiError::Status { status: 429, body: String::new() }.is_transient());
        assert!(!ApiError::Status { status: 404, body: String::new() }.is_transient());
        assert!(!ApiError::Decode("eof".into()).is_transient());
    }

    #[test]
    fn test_range_checks() {
        assert!(ValidationError::check_range("position_limit", 0.5, 0.01, 1.0).is_ok());
        assert!(ValidationError::check_range("position_limit", 1.5, 0.01, 1.0).is_err());
        assert!(ValidationError::check_range("position_limit", f64::NAN, 0.01, 1.0).is_err());
        assert!(ValidationError::check_min("min_spread", 0.0001, 0.0001).is_ok());
        assert_eq!(
            ValidationError::check_not_empty("symbol", "  "),
            Err(ValidationError::Empty { field: "symbol" })
        );
    }
}
