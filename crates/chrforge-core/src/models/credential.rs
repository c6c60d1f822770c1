use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the secret of a [`Credential`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// A ready-to-use access token.
    AuthToken,
    /// A v3 refresh token exchanged for access tokens.
    RefreshToken,
    /// A key derived from a scanned QR login session.
    QrKey,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthToken => "auth_token",
            Self::RefreshToken => "refresh_token",
            Self::QrKey => "qr_key",
        }
    }
}

/// Opaque account credential. Immutable once issued.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    identifier: String,
    secret: String,
    kind: CredentialKind,
    issued_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(kind: CredentialKind, identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
            kind,
            issued_at: Utc::now(),
        }
    }

    pub fn auth_token(identifier: impl Into<String>, token: impl Into<String>) -> Self {
        Self::new(CredentialKind::AuthToken, identifier, token)
    }

    pub fn refresh_token(identifier: impl Into<String>, token: impl Into<String>) -> Self {
        Self::new(CredentialKind::RefreshToken, identifier, token)
    }

    pub fn qr_key(auth_session_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(CredentialKind::QrKey, auth_session_id, key)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn kind(&self) -> CredentialKind {
        self.kind
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .field("kind", &self.kind)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}
