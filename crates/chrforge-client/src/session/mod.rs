//! Session lifecycle: login, expiry tracking, single-flight refresh, token
//! rotation and logout.
//!
//! The manager is the only writer of session state. Readers get immutable
//! `Arc<LiveSession>` snapshots and never wait on network I/O; only
//! handshakes queue behind each other on the refresh gate.

mod login_flow;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrforge_core::config::SessionConfig;
use chrforge_core::errors::AuthError;
use chrforge_core::models::{Credential, CredentialKind, DeviceDetails, Session};
use chrforge_core::traits::{ICredentialStore, ITransport};
use chrforge_observability::{auth_span, events};
use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

pub use login_flow::IssuedTokens;

use crate::dispatch::{CallTracker, Exchange};
use login_flow::LoginFlow;

/// Where the session lifecycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No session and no handshake running.
    Unauthenticated,
    /// A login or refresh handshake is in flight.
    Authenticating,
    Authenticated,
    /// Still valid, but inside the refresh margin.
    Expiring,
    /// Expired, or dropped after a failed refresh.
    Invalidated,
}

/// A session snapshot together with its sequence space.
///
/// Token rotation produces a new snapshot sharing the same tracker, so
/// sequence ids keep increasing for the lifetime of the session.
#[derive(Debug)]
pub struct LiveSession {
    session: Session,
    calls: Arc<CallTracker>,
}

impl LiveSession {
    fn new(session: Session) -> Self {
        Self {
            session,
            calls: Arc::new(CallTracker::new()),
        }
    }

    fn rotated(&self, token: String) -> Self {
        Self {
            session: self.session.with_rotated_token(token),
            calls: Arc::clone(&self.calls),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn calls(&self) -> &Arc<CallTracker> {
        &self.calls
    }
}

#[derive(Debug)]
struct Slot {
    state: SessionState,
    live: Option<Arc<LiveSession>>,
    /// Credential able to rebuild the session; updated on every handshake.
    credential: Option<Credential>,
}

type AttemptResult = Result<Arc<LiveSession>, AuthError>;

pub struct SessionManager<T: ITransport> {
    exchange: Arc<Exchange<T>>,
    store: Arc<dyn ICredentialStore>,
    config: SessionConfig,
    device: DeviceDetails,
    fingerprint: Vec<u8>,
    /// Sequence space for handshakes made before a session exists.
    bootstrap: Arc<CallTracker>,
    slot: RwLock<Slot>,
    /// Serializes handshakes: at most one `Authenticating` transition.
    gate: tokio::sync::Mutex<()>,
    /// Completed handshakes, used by waiters to detect a finished attempt.
    attempts: AtomicU64,
    last_attempt: Mutex<Option<AttemptResult>>,
}

impl<T: ITransport> SessionManager<T> {
    pub fn new(
        exchange: Arc<Exchange<T>>,
        store: Arc<dyn ICredentialStore>,
        config: SessionConfig,
        device: DeviceDetails,
        install_id: Uuid,
    ) -> Self {
        let fingerprint = device.fingerprint(&install_id);
        Self {
            exchange,
            store,
            config,
            device,
            fingerprint,
            bootstrap: Arc::new(CallTracker::new()),
            slot: RwLock::new(Slot {
                state: SessionState::Unauthenticated,
                live: None,
                credential: None,
            }),
            gate: tokio::sync::Mutex::new(()),
            attempts: AtomicU64::new(0),
            last_attempt: Mutex::new(None),
        }
    }

    pub fn device(&self) -> &DeviceDetails {
        &self.device
    }

    pub fn device_fingerprint(&self) -> &[u8] {
        &self.fingerprint
    }

    pub fn state(&self) -> SessionState {
        let slot = self.read_slot();
        match (slot.state, &slot.live) {
            (SessionState::Authenticated, Some(live)) => {
                if live.session.is_expired() {
                    SessionState::Invalidated
                } else if self.within_margin(live) {
                    SessionState::Expiring
                } else {
                    SessionState::Authenticated
                }
            }
            (SessionState::Authenticated, None) => SessionState::Invalidated,
            (state, _) => state,
        }
    }

    /// The active session, if one exists and has not expired.
    pub fn current(&self) -> Result<Arc<LiveSession>, AuthError> {
        let slot = self.read_slot();
        let reason = match (slot.state, &slot.live) {
            (SessionState::Authenticated, Some(live)) if !live.session.is_expired() => {
                return Ok(Arc::clone(live));
            }
            (SessionState::Authenticated, Some(_)) => "session expired",
            (SessionState::Authenticating, _) => "authentication in progress",
            (SessionState::Unauthenticated, _) => "not authenticated",
            _ => "session invalidated",
        };
        Err(AuthError::NeedsAuth {
            reason: reason.to_string(),
        })
    }

    /// Log in with `credential`, replacing any existing session.
    pub async fn authenticate(&self, credential: Credential) -> Result<Session, AuthError> {
        let kind = credential.kind();
        let _gate = self.gate.lock().await;
        self.begin_authenticating("login");
        let result = self.handshake(&credential).instrument(auth_span!(kind)).await;
        let outcome = self.finish(result);
        match &outcome {
            Ok(live) => events::session_authenticated(
                kind.as_str(),
                live.session.account_id(),
                live.session
                    .expires_at()
                    .map(|exp| (exp - Utc::now()).num_seconds()),
            ),
            Err(e) => events::session_auth_failed(kind.as_str(), &e.to_string()),
        }
        outcome.map(|live| live.session.clone())
    }

    /// Log in with the credential held by the credential store.
    pub async fn resume(&self) -> Result<Session, AuthError> {
        let credential = self.load_stored()?.ok_or(AuthError::MissingCredential)?;
        self.authenticate(credential).await
    }

    /// Re-authenticate with the stored credential.
    ///
    /// The old session is invalidated first; concurrent callers see
    /// `NeedsAuth` until the refresh completes and then share its result.
    pub async fn refresh(&self) -> Result<Session, AuthError> {
        let stale = self.read_slot().live.clone();
        self.refresh_from(stale.as_ref())
            .await
            .map(|live| live.session.clone())
    }

    /// A usable session: the current one, or a refreshed one when it is
    /// absent, expired, or inside the refresh margin.
    pub async fn ensure_session(&self) -> Result<Arc<LiveSession>, AuthError> {
        match self.current() {
            Ok(live) if !self.within_margin(&live) || !self.can_reauthenticate() => Ok(live),
            Ok(live) => self.refresh_from(Some(&live)).await,
            Err(_) => self.refresh_from(None).await,
        }
    }

    /// Refresh after the server rejected `rejected`. If another caller has
    /// already replaced that session, the replacement is returned instead.
    pub async fn refresh_after_rejection(
        &self,
        rejected: &Arc<LiveSession>,
    ) -> Result<Arc<LiveSession>, AuthError> {
        self.refresh_from(Some(rejected)).await
    }

    /// Whether a refresh could produce a new access token. A bare access
    /// token that the server rejected cannot be renewed.
    pub fn can_reauthenticate(&self) -> bool {
        self.read_slot()
            .credential
            .as_ref()
            .is_some_and(|c| c.kind() != CredentialKind::AuthToken)
    }

    /// Install a server-rotated access token. Ignored when `live` is no
    /// longer the active snapshot. Returns whether the token was installed.
    pub fn rotate_token(&self, live: &Arc<LiveSession>, token: String) -> bool {
        let mut slot = self.write_slot();
        match &slot.live {
            Some(current) if Arc::ptr_eq(current, live) => {
                slot.live = Some(Arc::new(current.rotated(token)));
                true
            }
            _ => false,
        }
    }

    /// Drop the session and the stored credential. Valid from any state.
    pub fn logout(&self) -> Result<(), AuthError> {
        {
            let mut slot = self.write_slot();
            slot.state = SessionState::Unauthenticated;
            slot.live = None;
            slot.credential = None;
        }
        events::session_logged_out();
        self.store.clear().map_err(|e| AuthError::Store {
            reason: e.to_string(),
        })
    }

    /// Calls sent and not yet answered, across the session and handshakes.
    pub fn outstanding_calls(&self) -> usize {
        let session_calls = self
            .read_slot()
            .live
            .as_ref()
            .map_or(0, |live| live.calls.outstanding());
        session_calls + self.bootstrap.outstanding()
    }

    async fn refresh_from(&self, stale: Option<&Arc<LiveSession>>) -> AttemptResult {
        let observed = self.attempts.load(Ordering::SeqCst);
        let _gate = self.gate.lock().await;
        if self.attempts.load(Ordering::SeqCst) != observed {
            let shared = self
                .last_attempt
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            if let Some(result) = shared {
                return result;
            }
        }
        if let Some(live) = self.usable(stale) {
            return Ok(live);
        }

        let credential = match self.read_slot().credential.clone() {
            Some(credential) => credential,
            None => self.load_stored()?.ok_or(AuthError::MissingCredential)?,
        };
        let kind = credential.kind();
        self.begin_authenticating("refresh");
        let result = self
            .handshake(&credential)
            .instrument(auth_span!(kind))
            .await
            .map_err(refresh_error);
        let outcome = self.finish(result);
        match &outcome {
            Ok(_) => events::session_refreshed(kind.as_str()),
            Err(e) => events::session_auth_failed(kind.as_str(), &e.to_string()),
        }
        outcome
    }

    /// The active session, unless it is the stale one or needs a refresh.
    fn usable(&self, stale: Option<&Arc<LiveSession>>) -> Option<Arc<LiveSession>> {
        let live = self.current().ok()?;
        if stale.is_some_and(|s| Arc::ptr_eq(s, &live)) {
            return None;
        }
        if self.within_margin(&live) && self.can_reauthenticate() {
            return None;
        }
        Some(live)
    }

    async fn handshake(&self, credential: &Credential) -> Result<(Arc<LiveSession>, Credential), AuthError> {
        let flow = LoginFlow {
            exchange: &self.exchange,
            tracker: &self.bootstrap,
            config: &self.config,
            device: &self.device,
        };
        let issued = flow.run(credential).await?;
        let identifier = issued
            .account_id
            .clone()
            .unwrap_or_else(|| credential.identifier().to_string());
        let renewed = issued.credential(&identifier);

        let mut session = Session::new(issued.access_token, self.fingerprint.clone())
            .with_refresh_token(issued.refresh_token)
            .with_account_id(Some(identifier).filter(|id| !id.is_empty()));
        // Expiry counts from local receipt, so server clock skew cannot
        // produce an already-expired session.
        if let Some(lifetime) = issued.lifetime {
            session = session.expires_in(lifetime);
        }
        if let Some(issued_at) = issued.issued_at {
            session = session.issued_at_time(issued_at);
        }
        Ok((Arc::new(LiveSession::new(session)), renewed))
    }

    fn begin_authenticating(&self, reason: &str) {
        let mut slot = self.write_slot();
        if slot.live.take().is_some() {
            events::session_invalidated(reason);
        }
        slot.state = SessionState::Authenticating;
    }

    /// Record a handshake outcome and share it with waiting callers.
    fn finish(&self, result: Result<(Arc<LiveSession>, Credential), AuthError>) -> AttemptResult {
        let mut saved = None;
        let outcome = {
            let mut slot = self.write_slot();
            match result {
                Ok((live, credential)) if slot.state == SessionState::Authenticating => {
                    slot.live = Some(Arc::clone(&live));
                    slot.credential = Some(credential.clone());
                    slot.state = SessionState::Authenticated;
                    saved = Some(credential);
                    Ok(live)
                }
                Ok(_) => Err(AuthError::NeedsAuth {
                    reason: "logged out during authentication".to_string(),
                }),
                Err(e) => {
                    if slot.state == SessionState::Authenticating {
                        slot.state = if slot.credential.is_some() {
                            SessionState::Invalidated
                        } else {
                            SessionState::Unauthenticated
                        };
                    }
                    Err(e)
                }
            }
        };

        if let Some(credential) = saved {
            if let Err(e) = self.store.save(&credential) {
                tracing::warn!(error = %e, "failed to persist credential");
            }
        }
        *self
            .last_attempt
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(outcome.clone());
        self.attempts.fetch_add(1, Ordering::SeqCst);
        outcome
    }

    fn load_stored(&self) -> Result<Option<Credential>, AuthError> {
        self.store.load().map_err(|e| AuthError::Store {
            reason: e.to_string(),
        })
    }

    fn within_margin(&self, live: &LiveSession) -> bool {
        live.session
            .needs_refresh_at(Utc::now(), self.config.refresh_margin())
    }

    fn read_slot(&self) -> std::sync::RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slot(&self) -> std::sync::RwLockWriteGuard<'_, Slot> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handshake failures during refresh keep rejections distinct.
fn refresh_error(error: AuthError) -> AuthError {
    match error {
        AuthError::HandshakeFailed { step, reason } => AuthError::RefreshFailed {
            reason: format!("{step}: {reason}"),
        },
        other => other,
    }
}

impl<T: ITransport> std::fmt::Debug for SessionManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &self.state())
            .field("device", &self.device.device)
            .finish_non_exhaustive()
    }
}
