/// Session and credential lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("no usable session: {reason}")]
    NeedsAuth { reason: String },

    #[error("credentials rejected (code {code}): {reason}")]
    Rejected { code: i32, reason: String },

    #[error("session refresh failed: {reason}")]
    RefreshFailed { reason: String },

    #[error("no credential available to authenticate")]
    MissingCredential,

    #[error("login handshake failed at {step}: {reason}")]
    HandshakeFailed { step: String, reason: String },

    #[error("credential store error: {reason}")]
    Store { reason: String },
}
