//! Error taxonomy for the protocol client.
//!
//! Each subsystem owns an enum; [`ForgeError`] wraps them so every public
//! call returns a single `ForgeResult`.

mod auth_error;
mod config_error;
mod decode_error;
mod encode_error;
mod rpc_error;

pub use auth_error::AuthError;
pub use config_error::ConfigError;
pub use decode_error::DecodeError;
pub use encode_error::EncodeError;
pub use rpc_error::{
    ErrorCategory, RpcError, CODE_CONNECTION, CODE_MALFORMED_RESULT, CODE_SEQUENCE_MISMATCH,
    CODE_TASK_FAILED, CODE_TIMEOUT, CODE_UNEXPECTED_REPLY,
};

/// Top-level error for every chrforge operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForgeError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type ForgeResult<T> = Result<T, ForgeError>;

impl ForgeError {
    /// The retry category, if this error came from a remote call.
    ///
    /// Codec failures report `Protocol`: corrupted input is never transient.
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Rpc(e) => Some(e.category),
            Self::Decode(_) | Self::Encode(_) => Some(ErrorCategory::Protocol),
            Self::Auth(_) | Self::Config(_) => None,
        }
    }

    /// Whether the retry controller may attempt the call again.
    pub fn is_retryable(&self) -> bool {
        self.category().is_some_and(|c| c.is_transient())
    }

    /// The server-suggested delay, if any.
    pub fn retry_after(&self) -> Option<std::time::Duration> {
        match self {
            Self::Rpc(e) => e.retry_after,
            _ => None,
        }
    }
}
