//! Tracing setup: structured logging with span definitions and event types.

pub mod events;
pub mod spans;

use chrforge_core::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "CHRFORGE_LOG";

/// Install the default subscriber: JSON output at `info`, or whatever
/// `CHRFORGE_LOG` asks for.
pub fn init_tracing() -> bool {
    init_from_config(&ObservabilityConfig::default())
}

/// Install a JSON subscriber with an explicit filter, ignoring `CHRFORGE_LOG`.
pub fn init_tracing_with_filter(filter: &str) -> bool {
    install(EnvFilter::new(filter), true)
}

/// Initialize tracing from the `[observability]` config section.
///
/// `CHRFORGE_LOG` still wins over `log_level`. Returns `false` when a global
/// subscriber was already installed.
pub fn init_from_config(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    install(filter, config.json)
}

fn install(filter: EnvFilter, json: bool) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if json {
        builder
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .try_init()
            .is_ok()
    } else {
        builder.compact().try_init().is_ok()
    }
}
