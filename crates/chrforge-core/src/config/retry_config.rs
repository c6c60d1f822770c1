use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Bounded retry policy for transient failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt for transport and rate-limit failures.
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Upper bound on any single rate-limit wait, server-suggested or not.
    pub max_rate_limit_wait_ms: u64,
    pub backoff_multiplier: f64,
    /// Fraction of each delay randomised away (0.0 disables jitter).
    pub jitter_ratio: f64,
}

impl RetryConfig {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    pub fn max_rate_limit_wait(&self) -> Duration {
        Duration::from_millis(self.max_rate_limit_wait_ms)
    }

    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            initial_backoff_ms: defaults::DEFAULT_INITIAL_BACKOFF_MS,
            max_backoff_ms: defaults::DEFAULT_MAX_BACKOFF_MS,
            max_rate_limit_wait_ms: defaults::DEFAULT_MAX_RATE_LIMIT_WAIT_MS,
            backoff_multiplier: defaults::DEFAULT_BACKOFF_MULTIPLIER,
            jitter_ratio: defaults::DEFAULT_JITTER_RATIO,
        }
    }
}
