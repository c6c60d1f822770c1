//! Request dispatch: sequence allocation, envelope exchange and reply
//! classification, plus the session-aware entry point.

mod exchange;
mod headers;
mod reply;
mod sequence;

use std::sync::Arc;

use chrforge_codec::{Record, WireValue};
use chrforge_core::errors::ForgeResult;
use chrforge_core::traits::ITransport;
use chrforge_observability::events;

pub use exchange::{Exchange, Reply};
pub use headers::HeaderBuilder;
pub use reply::{classify_status, interpret, STATUS_TOO_MANY_REQUESTS};
pub use sequence::{CallTracker, PendingCall};

use crate::session::{LiveSession, SessionManager};

/// Sends calls on behalf of the active session.
///
/// Reads session snapshots but never writes them: a rotated token is
/// handed back to the [`SessionManager`].
pub struct Dispatcher<T: ITransport> {
    exchange: Arc<Exchange<T>>,
    sessions: Arc<SessionManager<T>>,
}

impl<T: ITransport> Dispatcher<T> {
    pub fn new(exchange: Arc<Exchange<T>>, sessions: Arc<SessionManager<T>>) -> Self {
        Self { exchange, sessions }
    }

    /// Call `method` on `path`, refreshing the session first if it is
    /// absent or expired.
    pub async fn call(&self, path: &str, method: &str, args: Record) -> ForgeResult<WireValue> {
        let live = self.sessions.ensure_session().await?;
        self.call_in(&live, path, method, args).await
    }

    /// Call `method` on `path` with an already obtained session snapshot.
    pub async fn call_in(
        &self,
        live: &Arc<LiveSession>,
        path: &str,
        method: &str,
        args: Record,
    ) -> ForgeResult<WireValue> {
        let token = live.session().session_token();
        let reply = self
            .exchange
            .send(live.calls(), path, method, args, Some(token))
            .await?;
        if let Some(rotated) = reply.rotated_token {
            if self.sessions.rotate_token(live, rotated) {
                events::token_rotated(method);
            }
        }
        reply.outcome.map_err(Into::into)
    }

    pub fn sessions(&self) -> &Arc<SessionManager<T>> {
        &self.sessions
    }
}

impl<T: ITransport> std::fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("exchange", &self.exchange)
            .finish_non_exhaustive()
    }
}
