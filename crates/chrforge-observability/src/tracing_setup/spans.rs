//! Span definitions per operation: remote call, authentication, retry loop.
//!
//! Spans never carry tokens or credential secrets.

/// Create a span for one remote call attempt.
#[macro_export]
macro_rules! rpc_span {
    ($path:expr, $method:expr, $sequence_id:expr) => {
        tracing::info_span!(
            "chrforge.rpc",
            path = %$path,
            method = %$method,
            sequence_id = $sequence_id
        )
    };
}

/// Create a span for a login handshake or refresh.
#[macro_export]
macro_rules! auth_span {
    ($kind:expr) => {
        tracing::info_span!("chrforge.auth", kind = ?$kind)
    };
}

/// Create a span covering every attempt of a retried call.
#[macro_export]
macro_rules! retry_span {
    ($method:expr, $max_retries:expr) => {
        tracing::info_span!("chrforge.retry", method = %$method, max_retries = $max_retries)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const RPC: &str = "chrforge.rpc";
    pub const AUTH: &str = "chrforge.auth";
    pub const RETRY: &str = "chrforge.retry";
}
