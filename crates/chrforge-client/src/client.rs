//! `ForgeClient`: config, session manager, dispatcher and retry controller
//! wired together.

use std::sync::Arc;

use chrforge_codec::{Record, ThriftRecord, WireValue};
use chrforge_core::config::ForgeConfig;
use chrforge_core::errors::{DecodeError, ForgeResult};
use chrforge_core::models::{Credential, EndpointRegistry, Session};
use chrforge_core::traits::{ICredentialStore, ITransport};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::dispatch::{Dispatcher, Exchange, HeaderBuilder};
use crate::retry::RetryController;
use crate::session::{SessionManager, SessionState};

/// Point-in-time view of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientStatus {
    pub state: SessionState,
    pub account_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub outstanding_calls: usize,
}

pub struct ForgeClient<T: ITransport> {
    config: ForgeConfig,
    sessions: Arc<SessionManager<T>>,
    dispatcher: Dispatcher<T>,
    retry: RetryController,
}

impl<T: ITransport> ForgeClient<T> {
    /// Build a client with the default endpoint catalogue.
    pub fn new(config: ForgeConfig, transport: T, store: Arc<dyn ICredentialStore>) -> ForgeResult<Self> {
        let registry = EndpointRegistry::new(config.domains.clone());
        Self::with_registry(config, registry, transport, store)
    }

    /// Build a client with a custom endpoint catalogue.
    pub fn with_registry(
        config: ForgeConfig,
        registry: EndpointRegistry,
        transport: T,
        store: Arc<dyn ICredentialStore>,
    ) -> ForgeResult<Self> {
        config.validate()?;
        let device = config.device.resolve()?;
        let headers = HeaderBuilder::new(&device, &config.client, registry.domains());
        let exchange = Arc::new(Exchange::new(
            Arc::new(transport),
            registry,
            headers,
            config.errors.clone(),
            config.client.request_timeout(),
        ));
        let sessions = Arc::new(SessionManager::new(
            Arc::clone(&exchange),
            store,
            config.session.clone(),
            device,
            Uuid::new_v4(),
        ));
        let dispatcher = Dispatcher::new(exchange, Arc::clone(&sessions));
        let retry = RetryController::new(config.retry.clone());
        Ok(Self {
            config,
            sessions,
            dispatcher,
            retry,
        })
    }

    pub async fn login(&self, credential: Credential) -> ForgeResult<Session> {
        Ok(self.sessions.authenticate(credential).await?)
    }

    /// Log in with the credential held by the store.
    pub async fn resume(&self) -> ForgeResult<Session> {
        Ok(self.sessions.resume().await?)
    }

    pub fn logout(&self) -> ForgeResult<()> {
        Ok(self.sessions.logout()?)
    }

    /// Call `method(args)` on endpoint `path` under the retry policy.
    pub async fn call(&self, path: &str, method: &str, args: Record) -> ForgeResult<WireValue> {
        self.retry.call(&self.dispatcher, path, method, &args).await
    }

    /// Call and decode a record-typed success value.
    pub async fn call_as<R: ThriftRecord>(&self, path: &str, method: &str, args: Record) -> ForgeResult<R> {
        let value = self.call(path, method, args).await?;
        let actual = value.ttype().to_string();
        let record = value.into_record().ok_or_else(|| DecodeError::FieldTypeMismatch {
            record: R::NAME.to_string(),
            field: 0,
            expected: "struct".to_string(),
            actual,
        })?;
        Ok(R::from_record(record)?)
    }

    pub fn status(&self) -> ClientStatus {
        let live = self.sessions.current().ok();
        ClientStatus {
            state: self.sessions.state(),
            account_id: live
                .as_ref()
                .and_then(|l| l.session().account_id().map(str::to_string)),
            expires_at: live.as_ref().and_then(|l| l.session().expires_at()),
            outstanding_calls: self.sessions.outstanding_calls(),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager<T>> {
        &self.sessions
    }

    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }
}

impl<T: ITransport> std::fmt::Debug for ForgeClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForgeClient")
            .field("sessions", &self.sessions)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
