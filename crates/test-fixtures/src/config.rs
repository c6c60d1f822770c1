//! Client configurations for tests.

use chrforge_core::config::ForgeConfig;

/// Defaults with deterministic, short backoff and no jitter.
pub fn fast_config() -> ForgeConfig {
    let mut config = ForgeConfig::default();
    config.retry.max_retries = 3;
    config.retry.initial_backoff_ms = 100;
    config.retry.max_backoff_ms = 1_000;
    config.retry.max_rate_limit_wait_ms = 10_000;
    config.retry.jitter_ratio = 0.0;
    config.client.request_timeout_ms = 5_000;
    config
}
