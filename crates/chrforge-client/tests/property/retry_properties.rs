use std::time::Duration;

use chrforge_client::retry::Backoff;
use chrforge_core::config::RetryConfig;
use proptest::prelude::*;

fn retry_config() -> impl Strategy<Value = RetryConfig> {
    (1u64..5_000, 0u64..60_000, 1.0f64..4.0, 0u64..120_000).prop_map(
        |(initial, extra, multiplier, rate_cap)| RetryConfig {
            initial_backoff_ms: initial,
            max_backoff_ms: initial + extra,
            backoff_multiplier: multiplier,
            max_rate_limit_wait_ms: rate_cap,
            jitter_ratio: 0.0,
            ..RetryConfig::default()
        },
    )
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap()
}

proptest! {
    #[test]
    fn delays_never_shrink_and_never_exceed_max(config in retry_config()) {
        let mut backoff = Backoff::new(&config);
        let mut previous = Duration::ZERO;
        for _ in 0..24 {
            let delay = backoff.next_delay();
            prop_assert!(delay <= config.max_backoff());
            prop_assert!(delay >= previous);
            previous = delay;
        }
    }

    #[test]
    fn jitter_only_shortens_within_ratio(config in retry_config(), ratio in 0.01f64..1.0) {
        let mut steady = Backoff::new(&config);
        let mut jittered = Backoff::new(&RetryConfig { jitter_ratio: ratio, ..config.clone() });
        for _ in 0..12 {
            let base = millis(steady.next_delay());
            let delay = millis(jittered.next_delay());
            let floor = (base as f64 * (1.0 - ratio)).floor() as u64;
            prop_assert!(delay <= base, "delay {} above base {}", delay, base);
            prop_assert!(delay >= floor, "delay {} below floor {}", delay, floor);
        }
    }

    #[test]
    fn rate_limit_waits_are_capped(config in retry_config(), suggested in proptest::option::of(0u64..1_000_000)) {
        let mut backoff = Backoff::new(&config);
        let delay = backoff.rate_limit_delay(suggested.map(Duration::from_millis));
        prop_assert!(delay <= config.max_rate_limit_wait());
        if let Some(ms) = suggested {
            prop_assert_eq!(delay, Duration::from_millis(ms).min(config.max_rate_limit_wait()));
        }
    }
}
