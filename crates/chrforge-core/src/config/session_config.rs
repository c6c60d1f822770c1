use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::{SECONDARY_QR_LOGIN_ENDPOINT, TOKEN_REFRESH_ENDPOINT};

/// Session lifecycle and login handshake settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Refresh this long before the session's expiry.
    pub refresh_margin_secs: u64,
    /// Call used to verify a plain access token. `None` skips verification.
    pub verify_method: Option<String>,
    pub verify_path: String,
    pub refresh_method: String,
    pub refresh_path: String,
    pub qr_login_method: String,
    pub qr_login_path: String,
    /// Ask the server for an auto-login capable session on QR login.
    pub auto_login: bool,
}

impl SessionConfig {
    pub fn refresh_margin(&self) -> Duration {
        Duration::from_secs(self.refresh_margin_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_margin_secs: defaults::DEFAULT_REFRESH_MARGIN_SECS,
            verify_method: Some(defaults::DEFAULT_VERIFY_METHOD.to_string()),
            verify_path: defaults::DEFAULT_VERIFY_PATH.to_string(),
            refresh_method: defaults::DEFAULT_REFRESH_METHOD.to_string(),
            refresh_path: TOKEN_REFRESH_ENDPOINT.to_string(),
            qr_login_method: defaults::DEFAULT_QR_LOGIN_METHOD.to_string(),
            qr_login_path: SECONDARY_QR_LOGIN_ENDPOINT.to_string(),
            auto_login: true,
        }
    }
}
