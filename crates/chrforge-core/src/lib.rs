//! # chrforge-core
//!
//! Foundation crate for the chrforge protocol client.
//! Defines the shared types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::ForgeConfig;
pub use errors::{AuthError, ConfigError, DecodeError, EncodeError, ErrorCategory, ForgeError, ForgeResult, RpcError};
pub use models::{Credential, CredentialKind, DeviceDetails, DeviceType, Session};
