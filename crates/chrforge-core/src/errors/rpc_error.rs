use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Client-side code for a request that timed out.
pub const CODE_TIMEOUT: i32 = -1;
/// Client-side code for a connection-level failure.
pub const CODE_CONNECTION: i32 = -2;
/// Client-side code for a reply whose sequence id does not match the call.
pub const CODE_SEQUENCE_MISMATCH: i32 = -10;
/// Client-side code for a reply envelope of the wrong kind or method.
pub const CODE_UNEXPECTED_REPLY: i32 = -11;
/// Client-side code for a reply whose result record cannot be interpreted.
pub const CODE_MALFORMED_RESULT: i32 = -12;
/// Client-side code for a detached send task that died.
pub const CODE_TASK_FAILED: i32 = -13;

/// How an [`RpcError`] should be treated by the retry controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Credential rejected or session expired; refresh then retry once.
    Auth,
    /// Server-imposed throttling; wait and retry.
    RateLimit,
    /// Sequence mismatch or schema/version skew; never retried.
    Protocol,
    /// Network or HTTP failure; retried with backoff.
    Transport,
    /// A declared exception the client has no policy for.
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::RateLimit => "rate_limit",
            Self::Protocol => "protocol",
            Self::Transport => "transport",
            Self::Unknown => "unknown",
        }
    }

    /// Whether errors of this category are worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport | Self::RateLimit)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed remote call, classified for retry purposes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{category} error (code {code}): {message}")]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub category: ErrorCategory,
    /// Delay suggested by the server before retrying.
    pub retry_after: Option<Duration>,
}

impl RpcError {
    pub fn new(code: i32, message: impl Into<String>, category: ErrorCategory) -> Self {
        Self {
            code,
            message: message.into(),
            category,
            retry_after: None,
        }
    }

    pub fn transport(code: i32, message: impl Into<String>) -> Self {
        Self::new(code, message, ErrorCategory::Transport)
    }

    pub fn protocol(code: i32, message: impl Into<String>) -> Self {
        Self::new(code, message, ErrorCategory::Protocol)
    }

    pub fn auth(code: i32, message: impl Into<String>) -> Self {
        Self::new(code, message, ErrorCategory::Auth)
    }

    pub fn rate_limited(code: i32, message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self {
            retry_after,
            ..Self::new(code, message, ErrorCategory::RateLimit)
        }
    }

    pub fn timeout(method: &str, after: Duration) -> Self {
        Self::transport(
            CODE_TIMEOUT,
            format!("{method} timed out after {}ms", after.as_millis()),
        )
    }

    pub fn sequence_mismatch(expected: i32, actual: i32) -> Self {
        Self::protocol(
            CODE_SEQUENCE_MISMATCH,
            format!("reply sequence id {actual} does not match request {expected}"),
        )
    }
}
