use chrforge_core::config::ObservabilityConfig;
use chrforge_observability::{init_from_config, init_tracing, init_tracing_with_filter};

// Installs the process-wide subscriber, so it lives in its own test binary.
#[test]
fn only_the_first_global_subscriber_is_installed() {
    assert!(init_tracing_with_filter("warn"));
    assert!(!init_tracing());
    assert!(!init_from_config(&ObservabilityConfig {
        log_level: "debug".to_string(),
        json: false,
    }));
}
