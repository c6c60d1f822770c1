//! Structured log events for key client operations.
//!
//! Each function emits a `tracing` event with structured fields.

/// Log a completed login handshake.
pub fn session_authenticated(kind: &str, account_id: Option<&str>, expires_in_secs: Option<i64>) {
    tracing::info!(
        event = "session_authenticated",
        kind = %kind,
        account_id = ?account_id,
        expires_in_secs = ?expires_in_secs,
        "session authenticated"
    );
}

/// Log a successful session refresh.
pub fn session_refreshed(via: &str) {
    tracing::info!(event = "session_refreshed", via = %via, "session refreshed");
}

/// Log a failed login or refresh.
pub fn session_auth_failed(kind: &str, reason: &str) {
    tracing::warn!(
        event = "session_auth_failed",
        kind = %kind,
        reason = %reason,
        "authentication failed"
    );
}

/// Log a session being dropped before its replacement is ready.
pub fn session_invalidated(reason: &str) {
    tracing::info!(event = "session_invalidated", reason = %reason, "session invalidated");
}

/// Log an explicit logout.
pub fn session_logged_out() {
    tracing::info!(event = "session_logged_out", "session logged out");
}

/// Log a server-driven access token rotation.
pub fn token_rotated(method: &str) {
    tracing::debug!(event = "token_rotated", method = %method, "access token rotated");
}

/// Log a failed remote call attempt.
pub fn rpc_failed(method: &str, sequence_id: i32, category: &str, code: i32) {
    tracing::debug!(
        event = "rpc_failed",
        method = %method,
        sequence_id = sequence_id,
        category = %category,
        code = code,
        "remote call failed"
    );
}

/// Log a reply answering a different sequence id than the call.
pub fn sequence_mismatch(method: &str, expected: i32, actual: i32) {
    tracing::warn!(
        event = "sequence_mismatch",
        method = %method,
        expected = expected,
        actual = actual,
        "reply sequence id mismatch"
    );
}

/// Log a scheduled retry.
pub fn retry_scheduled(method: &str, attempt: u32, delay_ms: u64, category: &str) {
    tracing::debug!(
        event = "retry_scheduled",
        method = %method,
        attempt = attempt,
        delay_ms = delay_ms,
        category = %category,
        "retry scheduled"
    );
}

/// Log a call giving up after its retry budget.
pub fn retry_exhausted(method: &str, attempts: u32, category: &str) {
    tracing::warn!(
        event = "retry_exhausted",
        method = %method,
        attempts = attempts,
        category = %category,
        "retries exhausted"
    );
}
