//! Exponential backoff with jitter.

use std::time::Duration;

use chrforge_core::config::RetryConfig;
use rand::Rng;

/// Delay sequence for one retried call.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max: Duration,
    multiplier: f64,
    jitter_ratio: f64,
    max_rate_limit_wait: Duration,
}

impl Backoff {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            next: config.initial_backoff(),
            max: config.max_backoff(),
            multiplier: config.backoff_multiplier,
            jitter_ratio: config.jitter_ratio,
            max_rate_limit_wait: config.max_rate_limit_wait(),
        }
    }

    /// Next transport-failure delay. Grows by the multiplier up to the max;
    /// jitter only ever shortens a delay.
    pub fn next_delay(&mut self) -> Duration {
        let base = self.next;
        self.next = scale(base, self.multiplier).unwrap_or(self.max).min(self.max);
        self.jitter(base)
    }

    /// Delay before retrying a rate-limited call: the server's suggestion
    /// when present, otherwise the next backoff step, capped either way.
    pub fn rate_limit_delay(&mut self, suggested: Option<Duration>) -> Duration {
        let delay = match suggested {
            Some(delay) => delay,
            None => self.next_delay(),
        };
        delay.min(self.max_rate_limit_wait)
    }

    fn jitter(&self, delay: Duration) -> Duration {
        if self.jitter_ratio <= 0.0 || delay.is_zero() {
            return delay;
        }
        let cut = rand::thread_rng().gen_range(0.0..self.jitter_ratio.min(1.0));
        scale(delay, 1.0 - cut).unwrap_or(delay)
    }
}

/// `delay * factor`, rounded to whole milliseconds.
fn scale(delay: Duration, factor: f64) -> Option<Duration> {
    let millis = (delay.as_secs_f64() * 1_000.0 * factor).round();
    if !millis.is_finite() || millis < 0.0 || millis > u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_millis(millis as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(jitter_ratio: f64) -> RetryConfig {
        RetryConfig {
            initial_backoff_ms: 100,
            max_backoff_ms: 1_000,
            max_rate_limit_wait_ms: 5_000,
            backoff_multiplier: 2.0,
            jitter_ratio,
            ..RetryConfig::default()
        }
    }

    #[test]
    fn doubles_up_to_max_without_jitter() {
        let mut backoff = Backoff::new(&config(0.0));
        let delays: Vec<u64> = (0..6).map(|_| backoff.next_delay().as_millis() as u64).collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1_000, 1_000]);
    }

    #[test]
    fn jitter_stays_within_ratio() {
        for _ in 0..100 {
            let delay = Backoff::new(&config(0.5)).next_delay();
            assert!(delay <= Duration::from_millis(100));
            assert!(delay >= Duration::from_millis(50));
        }
    }

    #[test]
    fn rate_limit_prefers_server_delay_and_caps_it() {
        let mut backoff = Backoff::new(&config(0.0));
        assert_eq!(
            backoff.rate_limit_delay(Some(Duration::from_secs(2))),
            Duration::from_secs(2)
        );
        assert_eq!(
            backoff.rate_limit_delay(Some(Duration::from_secs(60))),
            Duration::from_secs(5)
        );
        assert_eq!(backoff.rate_limit_delay(None), Duration::from_millis(100));
    }
}
