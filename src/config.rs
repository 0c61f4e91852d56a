//! Process configuration from environment variables.
//!
//! | Variable                          | Default | Meaning                                  |
//! |-----------------------------------|---------|------------------------------------------|
//! | `GITHUB_TOKEN`                    | none    | API token; anonymous access without one  |
//! | `PORT`                            | 8000    | Listen port                              |
//! | `BACKSTROKE_WEBHOOK_SECRET`       | none    | Require signed deliveries when set       |
//! | `BACKSTROKE_FANOUT_CONCURRENCY`   | 8       | Forks evaluated at once (minimum 1)      |
//! | `BACKSTROKE_REQUEST_TIMEOUT_SECS` | 30      | Timeout for each GitHub call             |
//!
//! Unset, empty or unparsable values fall back to the default.

use std::time::Duration;

use crate::sync::{DEFAULT_FAN_OUT_CONCURRENCY, FanOutOptions};

pub const DEFAULT_PORT: u16 = 8000;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Settings for the sync core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    pub fan_out_concurrency: usize,
    pub request_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            fan_out_concurrency: DEFAULT_FAN_OUT_CONCURRENCY,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl SyncConfig {
    pub fn fan_out_options(&self) -> FanOutOptions {
        FanOutOptions {
            concurrency: self.fan_out_concurrency,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub github_token: Option<String>,
    pub port: u16,
    pub webhook_secret: Option<String>,
    pub sync: SyncConfig,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field("port", &self.port)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("sync", &self.sync)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let fan_out_concurrency = non_empty("BACKSTROKE_FANOUT_CONCURRENCY")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_FAN_OUT_CONCURRENCY)
            .max(1);

        let timeout_secs = non_empty("BACKSTROKE_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&secs| secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Config {
            github_token: non_empty("GITHUB_TOKEN"),
            port: non_empty("PORT")
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            webhook_secret: non_empty("BACKSTROKE_WEBHOOK_SECRET"),
            sync: SyncConfig {
                fan_out_concurrency,
                request_timeout: Duration::from_secs(timeout_secs),
            },
        }
    }
}
