/// Configuration loading and validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config: {reason}")]
    Parse { reason: String },

    #[error("failed to read config {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("unsupported device type: {name}")]
    UnknownDevice { name: String },

    #[error("custom device {name} needs app_version, system_name and system_version")]
    IncompleteCustomDevice { name: String },
}
