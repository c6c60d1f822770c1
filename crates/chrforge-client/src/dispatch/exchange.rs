//! One request/reply exchange over the transport.

use std::sync::Arc;
use std::time::Duration;

use chrforge_codec::{Envelope, Record, WireValue};
use chrforge_core::config::ErrorCodeConfig;
use chrforge_core::constants::NEXT_ACCESS_HEADER;
use chrforge_core::errors::{ForgeResult, RpcError, CODE_TASK_FAILED};
use chrforge_core::models::EndpointRegistry;
use chrforge_core::traits::{ITransport, TransportRequest};
use chrforge_observability::{events, rpc_span};
use tracing::Instrument;

use super::headers::HeaderBuilder;
use super::reply::{classify_status, interpret};
use super::sequence::CallTracker;

/// What one exchange produced once the reply envelope was matched.
#[derive(Debug, Clone)]
pub struct Reply {
    pub sequence_id: i32,
    pub outcome: Result<WireValue, RpcError>,
    /// Replacement access token announced by the server.
    pub rotated_token: Option<String>,
}

/// Encodes calls, sends them and decodes the matching reply.
///
/// Holds no session state: the caller supplies the access token and the
/// tracker that owns the sequence space.
pub struct Exchange<T: ITransport> {
    transport: Arc<T>,
    registry: EndpointRegistry,
    headers: HeaderBuilder,
    error_codes: ErrorCodeConfig,
    timeout: Duration,
}

impl<T: ITransport> Exchange<T> {
    pub fn new(
        transport: Arc<T>,
        registry: EndpointRegistry,
        headers: HeaderBuilder,
        error_codes: ErrorCodeConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            registry,
            headers,
            error_codes,
            timeout,
        }
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// Send `method(args)` to `path`.
    ///
    /// Transport, decode and sequence failures are returned as errors. A
    /// reply that decodes and matches is returned even when it carries a
    /// remote error, so a rotated token is never lost.
    pub async fn send(
        &self,
        tracker: &Arc<CallTracker>,
        path: &str,
        method: &str,
        args: Record,
        access_token: Option<&str>,
    ) -> ForgeResult<Reply> {
        let sequence_id = tracker.allocate()?;
        self.send_with_sequence(tracker, sequence_id, path, method, args, access_token)
            .instrument(rpc_span!(path, method, sequence_id))
            .await
    }

    async fn send_with_sequence(
        &self,
        tracker: &Arc<CallTracker>,
        sequence_id: i32,
        path: &str,
        method: &str,
        args: Record,
        access_token: Option<&str>,
    ) -> ForgeResult<Reply> {
        let protocol = self.registry.protocol_for(path);
        let body = Envelope::call(method, sequence_id, args).encode(protocol)?;
        let request = TransportRequest {
            url: self.registry.full_url(path, None),
            headers: self.headers.build(access_token),
            body,
        };

        // The send runs detached so an abandoned call still drains its reply
        // (or times out) and clears its pending entry.
        tracker.begin(sequence_id, method);
        let transport = Arc::clone(&self.transport);
        let task_tracker = Arc::clone(tracker);
        let timeout = self.timeout;
        let task = tokio::spawn(async move {
            let sent = tokio::time::timeout(timeout, transport.send(request)).await;
            task_tracker.complete(sequence_id);
            sent
        });

        let response = match task.await {
            Ok(Ok(response)) => response?,
            Ok(Err(_elapsed)) => return Err(RpcError::timeout(method, timeout).into()),
            Err(join) => {
                return Err(RpcError::transport(CODE_TASK_FAILED, format!("send task failed: {join}")).into())
            }
        };

        if !response.is_success() {
            let error = classify_status(&response);
            events::rpc_failed(method, sequence_id, error.category.as_str(), error.code);
            return Err(error.into());
        }

        let rotated_token = response
            .header(NEXT_ACCESS_HEADER)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let envelope = Envelope::decode(&response.body, protocol)?;
        if envelope.sequence_id != sequence_id {
            events::sequence_mismatch(method, sequence_id, envelope.sequence_id);
            return Err(RpcError::sequence_mismatch(sequence_id, envelope.sequence_id).into());
        }

        let exception_type = self.registry.exception_type(path);
        let outcome = interpret(method, exception_type, envelope, &self.error_codes);
        if let Err(e) = &outcome {
            events::rpc_failed(method, sequence_id, e.category.as_str(), e.code);
        }
        Ok(Reply {
            sequence_id,
            outcome,
            rotated_token,
        })
    }
}

impl<T: ITransport> std::fmt::Debug for Exchange<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exchange")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
