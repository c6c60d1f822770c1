//! Bounded retry policy around the dispatcher.
//!
//! - Transport failures: up to `max_retries` more attempts with backoff.
//! - Rate limiting: the server-suggested delay, else backoff, capped.
//! - Auth failures: one refresh, then one more attempt.
//! - Protocol and decode failures: never retried.
//!
//! Every attempt re-sends the original arguments under a fresh sequence id.

mod backoff;

use chrforge_codec::{Record, WireValue};
use chrforge_core::config::RetryConfig;
use chrforge_core::errors::{AuthError, ErrorCategory, ForgeError, ForgeResult, RpcError};
use chrforge_core::traits::ITransport;
use chrforge_observability::{events, retry_span};
use tracing::Instrument;

pub use backoff::Backoff;

use crate::dispatch::Dispatcher;

#[derive(Debug, Clone)]
pub struct RetryController {
    config: RetryConfig,
}

impl RetryController {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `method(args)` on `path` under the retry policy.
    pub async fn call<T: ITransport>(
        &self,
        dispatcher: &Dispatcher<T>,
        path: &str,
        method: &str,
        args: &Record,
    ) -> ForgeResult<WireValue> {
        self.run(dispatcher, path, method, args)
            .instrument(retry_span!(method, self.config.max_retries))
            .await
    }

    async fn run<T: ITransport>(
        &self,
        dispatcher: &Dispatcher<T>,
        path: &str,
        method: &str,
        args: &Record,
    ) -> ForgeResult<WireValue> {
        let sessions = dispatcher.sessions();
        let mut backoff = Backoff::new(&self.config);
        let mut retries = 0u32;
        let mut refreshed = false;

        loop {
            let live = sessions.ensure_session().await?;
            let error = match dispatcher.call_in(&live, path, method, args.clone()).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            match error.category() {
                Some(ErrorCategory::Auth) => {
                    if refreshed || !sessions.can_reauthenticate() {
                        return Err(terminal_auth(error));
                    }
                    refreshed = true;
                    sessions.refresh_after_rejection(&live).await?;
                }
                Some(category @ (ErrorCategory::Transport | ErrorCategory::RateLimit)) => {
                    if retries >= self.config.max_retries {
                        events::retry_exhausted(method, retries + 1, category.as_str());
                        return Err(error);
                    }
                    let delay = match category {
                        ErrorCategory::RateLimit => backoff.rate_limit_delay(error.retry_after()),
                        _ => backoff.next_delay(),
                    };
                    retries += 1;
                    events::retry_scheduled(
                        method,
                        retries,
                        u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        category.as_str(),
                    );
                    tokio::time::sleep(delay).await;
                }
                _ => return Err(error),
            }
        }
    }
}

impl Default for RetryController {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

/// A rejection that survived its one refresh is final.
fn terminal_auth(error: ForgeError) -> ForgeError {
    match error {
        ForgeError::Rpc(RpcError { code, message, .. }) => AuthError::Rejected {
            code,
            reason: message,
        }
        .into(),
        other => other,
    }
}
