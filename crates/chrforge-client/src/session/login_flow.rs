//! Login handshakes, one per credential kind.
//!
//! Every handshake is an ordinary envelope exchange made before a session
//! exists, on the session manager's bootstrap sequence space.

use std::sync::Arc;
use std::time::Duration;

use chrforge_codec::records::{
    QrCodeLoginV2Request, QrCodeLoginV2Response, RefreshAccessTokenRequest,
    RefreshAccessTokenResponse,
};
use chrforge_codec::{Record, ThriftRecord, WireValue};
use chrforge_core::config::SessionConfig;
use chrforge_core::errors::{AuthError, ErrorCategory, ForgeError, RpcError};
use chrforge_core::models::{Credential, CredentialKind, DeviceDetails};
use chrforge_core::traits::ITransport;
use chrono::{DateTime, Utc};

use crate::dispatch::{CallTracker, Exchange};

/// Tokens issued by a successful handshake.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub lifetime: Option<Duration>,
    pub issued_at: Option<DateTime<Utc>>,
    pub account_id: Option<String>,
}

impl IssuedTokens {
    fn access_only(access_token: String) -> Self {
        Self {
            access_token,
            refresh_token: None,
            lifetime: None,
            issued_at: None,
            account_id: None,
        }
    }

    /// Credential to persist so the session can be rebuilt later.
    ///
    /// A refresh token outlives access tokens, so it is preferred.
    pub fn credential(&self, identifier: &str) -> Credential {
        match &self.refresh_token {
            Some(refresh) => Credential::refresh_token(identifier, refresh.as_str()),
            None => Credential::auth_token(identifier, self.access_token.as_str()),
        }
    }
}

impl std::fmt::Debug for IssuedTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedTokens")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("lifetime", &self.lifetime)
            .field("account_id", &self.account_id)
            .finish()
    }
}

pub(crate) struct LoginFlow<'a, T: ITransport> {
    pub exchange: &'a Exchange<T>,
    pub tracker: &'a Arc<CallTracker>,
    pub config: &'a SessionConfig,
    pub device: &'a DeviceDetails,
}

impl<T: ITransport> LoginFlow<'_, T> {
    pub async fn run(&self, credential: &Credential) -> Result<IssuedTokens, AuthError> {
        match credential.kind() {
            CredentialKind::AuthToken => self.verify_token(credential.secret()).await,
            CredentialKind::RefreshToken => self.refresh(credential.secret()).await,
            CredentialKind::QrKey => self.qr_login(credential.identifier()).await,
        }
    }

    /// Verify a plain access token with a cheap authenticated call.
    async fn verify_token(&self, token: &str) -> Result<IssuedTokens, AuthError> {
        if let Some(method) = &self.config.verify_method {
            self.exchange("verify", &self.config.verify_path, method, Record::new(), Some(token))
                .await?;
        }
        Ok(IssuedTokens::access_only(token.to_string()))
    }

    /// Exchange a v3 refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedTokens, AuthError> {
        let request = RefreshAccessTokenRequest {
            refresh_token: refresh_token.to_string(),
        };
        let args = Record::new().with(1, request.to_wire());
        let value = self
            .exchange("refresh", &self.config.refresh_path, &self.config.refresh_method, args, None)
            .await?;
        let response = decode_struct::<RefreshAccessTokenResponse>("refresh", value)?;
        Ok(IssuedTokens {
            access_token: response.access_token,
            refresh_token: Some(
                response
                    .refresh_token
                    .unwrap_or_else(|| refresh_token.to_string()),
            ),
            lifetime: lifetime_secs(response.duration_until_refresh_secs),
            issued_at: response
                .token_issue_time_epoch_secs
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
            account_id: None,
        })
    }

    /// Complete a secondary-device QR login for an authorized session id.
    async fn qr_login(&self, auth_session_id: &str) -> Result<IssuedTokens, AuthError> {
        let request = QrCodeLoginV2Request {
            auth_session_id: auth_session_id.to_string(),
            system_name: self.device.system_name.clone(),
            model_name: self.device.system_model.clone(),
            auto_login_is_required: self.config.auto_login,
        };
        let args = Record::new().with(1, request.to_wire());
        let value = self
            .exchange("qr_login", &self.config.qr_login_path, &self.config.qr_login_method, args, None)
            .await?;
        let response = decode_struct::<QrCodeLoginV2Response>("qr_login", value)?;

        let mut issued = match (response.token_v3, response.access_token_v2) {
            (Some(v3), _) => IssuedTokens {
                access_token: v3.access_token,
                refresh_token: v3.refresh_token,
                lifetime: lifetime_secs(v3.duration_until_refresh_secs),
                issued_at: None,
                account_id: None,
            },
            (None, Some(v2)) => IssuedTokens::access_only(v2),
            (None, None) => {
                return Err(AuthError::HandshakeFailed {
                    step: "qr_login".to_string(),
                    reason: "reply carries no access token".to_string(),
                })
            }
        };
        issued.account_id = response.mid;
        Ok(issued)
    }

    async fn exchange(
        &self,
        step: &str,
        path: &str,
        method: &str,
        args: Record,
        access_token: Option<&str>,
    ) -> Result<WireValue, AuthError> {
        let reply = self
            .exchange
            .send(self.tracker, path, method, args, access_token)
            .await
            .map_err(|e| handshake_error(step, e))?;
        reply.outcome.map_err(|e| handshake_error(step, e.into()))
    }
}

fn decode_struct<R: ThriftRecord>(step: &str, value: WireValue) -> Result<R, AuthError> {
    let record = value.into_record().ok_or_else(|| AuthError::HandshakeFailed {
        step: step.to_string(),
        reason: format!("expected a {} record", R::NAME),
    })?;
    R::from_record(record).map_err(|e| handshake_error(step, e.into()))
}

fn lifetime_secs(secs: Option<i64>) -> Option<Duration> {
    secs.map(|s| Duration::from_secs(u64::try_from(s).unwrap_or(0)))
}

/// Auth-category failures mean the server refused the credential.
fn handshake_error(step: &str, error: ForgeError) -> AuthError {
    match error {
        ForgeError::Rpc(RpcError {
            code,
            message,
            category: ErrorCategory::Auth,
            ..
        }) => AuthError::Rejected {
            code,
            reason: message,
        },
        ForgeError::Auth(e) => e,
        other => AuthError::HandshakeFailed {
            step: step.to_string(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use chrforge_core::errors::DecodeError;

    use super::*;

    #[test]
    fn auth_category_becomes_rejected() {
        let err = handshake_error("verify", RpcError::auth(8, "expired").into());
        assert_eq!(
            err,
            AuthError::Rejected {
                code: 8,
                reason: "expired".into()
            }
        );
    }

    #[test]
    fn other_failures_name_the_step() {
        let err = handshake_error(
            "refresh",
            DecodeError::UnexpectedEof {
                offset: 0,
                needed: 1,
                remaining: 0,
            }
            .into(),
        );
        assert!(matches!(err, AuthError::HandshakeFailed { ref step, .. } if step == "refresh"));
    }

    #[test]
    fn negative_lifetimes_clamp_to_zero() {
        assert_eq!(lifetime_secs(Some(-5)), Some(Duration::ZERO));
        assert_eq!(lifetime_secs(Some(60)), Some(Duration::from_secs(60)));
        assert_eq!(lifetime_secs(None), None);
    }

    #[test]
    fn persisted_credential_prefers_refresh_token() {
        let mut issued = IssuedTokens::access_only("access".into());
        assert_eq!(issued.credential("u1").kind(), CredentialKind::AuthToken);
        issued.refresh_token = Some("refresh".into());
        let credential = issued.credential("u1");
        assert_eq!(credential.kind(), CredentialKind::RefreshToken);
        assert_eq!(credential.secret(), "refresh");
    }
}
