//! Client configuration.

use dashboard_core::ApiError;
use std::time::Duration;

/// Backend API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Scheme, host and port of the backend, without the `/api` prefix
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries for transient failures of idempotent requests
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further attempt
    pub retry_backoff: Duration,
}

impl ApiConfig {
    /// Environment variable holding the base URL.
    pub const BASE_URL_ENV: &'static str = "DASHBOARD_API_URL";
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8000";
    /// Every backend route lives under this prefix.
    pub const API_PREFIX: &'static str = "/api";

    const MAX_BACKOFF: Duration = Duration::from_secs(5);

    /// Create config for a base URL with default timeouts and retries.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_backoff: Duration::from_millis(200),
        }
    }

    /// Load the base URL from `DASHBOARD_API_URL`, falling back to localhost.
    pub fn from_env() -> Self {
        let base_url = std::env::var(Self::BASE_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    /// Check the base URL is usable.
    pub fn validate(&self) -> Result<(), ApiError> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ApiError::Configuration(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        Ok(())
    }

    /// Full URL for a route such as `/trades`.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url.trim().trim_end_matches('/'),
            Self::API_PREFIX,
            path
        )
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(16);
        self.retry_backoff.saturating_mul(factor).min(Self::MAX_BACKOFF)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}
