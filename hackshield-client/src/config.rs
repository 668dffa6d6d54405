//! Block Service configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use hackshield_core::constants::{DEFAULT_SERVICE_URL, LEDGER_POLL_INTERVAL};
use hackshield_core::error::{HackshieldError, Result};

/// Where and how to reach the Block Service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL, without a trailing endpoint path
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// Ledger polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVICE_URL.into(),
            timeout_seconds: 60,
            poll_interval_ms: LEDGER_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

impl ServiceConfig {
    /// Creates a config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Loads `.env` and reads `HACKSHIELD_API_URL`, `HACKSHIELD_TIMEOUT_SECS`
    /// and `HACKSHIELD_POLL_INTERVAL_MS`, falling back to defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Self {
            base_url: std::env::var("HACKSHIELD_API_URL").unwrap_or(defaults.base_url),
            timeout_seconds: std::env::var("HACKSHIELD_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_seconds),
            poll_interval_ms: std::env::var("HACKSHIELD_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.poll_interval_ms),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the ledger polling interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Ledger polling interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Checks the base URL and interval.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| HackshieldError::Config(format!("invalid base URL '{}': {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(HackshieldError::Config(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(HackshieldError::Config("poll interval must be positive".into()));
        }
        Ok(())
    }

    /// Full URL of an endpoint path such as `/encode`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
