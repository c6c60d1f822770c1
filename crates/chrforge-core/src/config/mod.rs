//! Configuration for the protocol client, loaded from TOML.

mod client_config;
pub mod defaults;
mod device_config;
mod domain_config;
mod error_code_config;
mod observability_config;
mod retry_config;
mod session_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use client_config::ClientConfig;
pub use device_config::DeviceConfig;
pub use domain_config::DomainConfig;
pub use error_code_config::ErrorCodeConfig;
pub use observability_config::ObservabilityConfig;
pub use retry_config::RetryConfig;
pub use session_config::SessionConfig;

use crate::errors::ConfigError;

/// Top-level configuration. Every section is optional in TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    pub client: ClientConfig,
    pub device: DeviceConfig,
    pub domains: DomainConfig,
    pub retry: RetryConfig,
    pub session: SessionConfig,
    pub errors: ErrorCodeConfig,
    pub observability: ObservabilityConfig,
}

impl ForgeConfig {
    /// Parse and validate a TOML document. Missing keys take defaults.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut config = Self::from_toml(&raw)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    pub fn apply_env_overrides(&mut self) {
        self.domains.apply_env();
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client.request_timeout_ms == 0 {
            return Err(invalid("client.request_timeout_ms", "must be positive"));
        }
        let retry = &self.retry;
        if retry.initial_backoff_ms > retry.max_backoff_ms {
            return Err(invalid(
                "retry.initial_backoff_ms",
                "must not exceed retry.max_backoff_ms",
            ));
        }
        if !(retry.backoff_multiplier >= 1.0) {
            return Err(invalid("retry.backoff_multiplier", "must be at least 1.0"));
        }
        if !(0.0..=1.0).contains(&retry.jitter_ratio) {
            return Err(invalid("retry.jitter_ratio", "must be within 0.0..=1.0"));
        }
        self.device.resolve()?;
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
