//! Per-session sequence ids and the table of calls awaiting a reply.

use std::sync::atomic::{AtomicI32, Ordering};

use chrforge_core::errors::{ForgeResult, RpcError, CODE_SEQUENCE_MISMATCH};
use dashmap::DashMap;
use tokio::time::Instant;

/// A call that has been sent and not yet answered or timed out.
#[derive(Debug, Clone)]
pub struct PendingCall {
    pub method: String,
    pub sent_at: Instant,
}

/// Allocates strictly increasing sequence ids and tracks outstanding calls.
///
/// Shared by every snapshot of one session, so token rotation does not
/// restart the counter.
#[derive(Debug)]
pub struct CallTracker {
    next: AtomicI32,
    pending: DashMap<i32, PendingCall>,
}

impl CallTracker {
    pub fn new() -> Self {
        Self {
            next: AtomicI32::new(1),
            pending: DashMap::new(),
        }
    }

    /// Next sequence id. Ids are never reused; running out is an error.
    pub fn allocate(&self) -> ForgeResult<i32> {
        self.next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| id.checked_add(1))
            .map_err(|_| {
                RpcError::protocol(CODE_SEQUENCE_MISMATCH, "sequence id space exhausted").into()
            })
    }

    /// The id the next allocation will return.
    pub fn peek(&self) -> i32 {
        self.next.load(Ordering::SeqCst)
    }

    pub fn begin(&self, sequence_id: i32, method: &str) {
        self.pending.insert(
            sequence_id,
            PendingCall {
                method: method.to_string(),
                sent_at: Instant::now(),
            },
        );
    }

    /// Mark a call acknowledged (replied, failed or timed out).
    pub fn complete(&self, sequence_id: i32) -> Option<PendingCall> {
        self.pending.remove(&sequence_id).map(|(_, call)| call)
    }

    pub fn is_pending(&self, sequence_id: i32) -> bool {
        self.pending.contains_key(&sequence_id)
    }

    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }
}

impl Default for CallTracker {
    fn default() -> Self {
        Self::new()
    }
}
