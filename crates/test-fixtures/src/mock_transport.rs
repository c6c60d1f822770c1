//! Scripted transport for dispatcher, session and retry tests.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrforge_core::errors::ForgeResult;
use chrforge_core::traits::{ITransport, TransportRequest, TransportResponse};

use crate::replies::request_path;

type Handler = dyn Fn(&TransportRequest, usize) -> ForgeResult<TransportResponse> + Send + Sync;

/// A transport whose replies come from a closure.
///
/// The closure receives each request and its zero-based call index.
/// Clones share the same handler and request log.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

struct Inner {
    handler: Box<Handler>,
    requests: Mutex<Vec<TransportRequest>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new(
        handler: impl Fn(&TransportRequest, usize) -> ForgeResult<TransportResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                handler: Box::new(handler),
                requests: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                delay: None,
            }),
        }
    }

    /// Sleep before answering each request.
    ///
    /// # Panics
    /// Panics if the transport has already been cloned.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        Arc::get_mut(&mut self.inner)
            .expect("with_delay must be called before cloning")
            .delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.inner.requests.lock().unwrap().clone()
    }

    /// Number of requests sent to `path`.
    pub fn calls_to(&self, path: &str) -> usize {
        self.inner
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| request_path(r) == path)
            .count()
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("calls", &self.call_count())
            .finish()
    }
}

impl ITransport for MockTransport {
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = ForgeResult<TransportResponse>> + Send {
        let inner = Arc::clone(&self.inner);
        async move {
            let index = inner.calls.fetch_add(1, Ordering::SeqCst);
            inner.requests.lock().unwrap().push(request.clone());
            if let Some(delay) = inner.delay {
                tokio::time::sleep(delay).await;
            }
            (inner.handler)(&request, index)
        }
    }
}
