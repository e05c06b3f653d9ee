//! Dashboard settings from the environment.

use etl_client::{BackendError, HttpJobBackend, DEFAULT_BACKEND_URL};
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub backend_url: String,
    pub poll_interval: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl DashboardConfig {
    /// `ETL_BACKEND_URL` and `ETL_POLL_INTERVAL_SECS`, falling back to defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(url) = std::env::var("ETL_BACKEND_URL") {
            if !url.trim().is_empty() {
                cfg.backend_url = url.trim().to_string();
            }
        }
        if let Ok(raw) = std::env::var("ETL_POLL_INTERVAL_SECS") {
            match parse_poll_interval(&raw) {
                Some(interval) => cfg.poll_interval = interval,
                None => tracing::warn!(
                    value = %raw,
                    "ignoring invalid ETL_POLL_INTERVAL_SECS; using {}s",
                    DEFAULT_POLL_INTERVAL.as_secs()
                ),
            }
        }
        cfg
    }

    pub fn backend(&self) -> Result<HttpJobBackend, BackendError> {
        HttpJobBackend::new(&self.backend_url)
    }
}

/// Whole seconds, at least one.
pub fn parse_poll_interval(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => None,
    }
}
