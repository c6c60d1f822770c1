use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated session.
///
/// Session values are immutable; the session manager replaces the whole
/// value on refresh or token rotation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    session_token: String,
    refresh_token: Option<String>,
    issued_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    lifetime: Option<Duration>,
    device_fingerprint: Vec<u8>,
    account_id: Option<String>,
}

impl Session {
    pub fn new(session_token: impl Into<String>, device_fingerprint: Vec<u8>) -> Self {
        Self {
            session_token: session_token.into(),
            refresh_token: None,
            issued_at: Utc::now(),
            expires_at: None,
            lifetime: None,
            device_fingerprint,
            account_id: None,
        }
    }

    pub fn issued_at_time(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = issued_at;
        self
    }

    /// Expire `lifetime` after the issue time.
    pub fn expires_in(mut self, lifetime: Duration) -> Self {
        let delta = chrono::Duration::from_std(lifetime).unwrap_or(chrono::Duration::MAX);
        self.expires_at = self.issued_at.checked_add_signed(delta);
        self.lifetime = Some(lifetime);
        self
    }

    pub fn expires_at_time(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self.lifetime = None;
        self
    }

    pub fn with_refresh_token(mut self, refresh_token: Option<String>) -> Self {
        self.refresh_token = refresh_token;
        self
    }

    pub fn with_account_id(mut self, account_id: Option<String>) -> Self {
        self.account_id = account_id;
        self
    }

    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn device_fingerprint(&self) -> &[u8] {
        &self.device_fingerprint
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// Sessions with unknown expiry never expire client-side.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the session expires within `margin` of `now`.
    ///
    /// The margin is capped at half the granted lifetime, so a short-lived
    /// session serves calls for at least half its life before a refresh.
    pub fn needs_refresh_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        let Some(exp) = self.expires_at else {
            return false;
        };
        let lifetime = self
            .lifetime
            .and_then(|l| chrono::Duration::from_std(l).ok())
            .unwrap_or(exp - self.issued_at);
        let margin = chrono::Duration::from_std(margin)
            .unwrap_or(chrono::Duration::MAX)
            .min(lifetime / 2);
        now.checked_add_signed(margin).map_or(true, |t| t >= exp)
    }

    /// Same session with a server-rotated access token.
    pub fn with_rotated_token(&self, token: impl Into<String>) -> Self {
        Self {
            session_token: token.into(),
            ..self.clone()
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("session_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("account_id", &self.account_id)
            .finish()
    }
}
