//! Call Registry
//!
//! Concurrent map from [`RequestId`] to the handle of the call running under
//! it. Workers register on submission and remove on completion; callers
//! cancel by id from any thread. No caller-side locking is needed.
//!
//! ## Stale entries
//!
//! Removal goes through a [`CallGuard`] whose `Drop` removes the entry, so
//! an entry disappears on every exit path: success, failure, cancellation,
//! panic, or the task being dropped by a pool shutdown. Each registration
//! carries a generation number and a guard only removes its own
//! registration, never a newer one that reused the same id.

use core_async::sync::CancellationToken;
use core_async::time::Instant;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::types::RequestId;

/// Cancellable reference to one in-flight operation.
#[derive(Debug, Clone)]
pub struct CallHandle {
    request_id: RequestId,
    token: CancellationToken,
    started_at: Instant,
    generation: u64,
}

impl CallHandle {
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

#[derive(Debug, Default)]
pub struct CallRegistry {
    calls: DashMap<RequestId, CallHandle>,
    next_generation: AtomicU64,
}

impl CallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `request_id`. A live registration under the same id is
    /// displaced: it keeps running but can no longer be cancelled by id.
    pub fn register(&self, request_id: RequestId, token: CancellationToken) -> CallHandle {
        let handle = CallHandle {
            request_id: request_id.clone(),
            token,
            started_at: Instant::now(),
            generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
        };

        if self.calls.insert(request_id, handle.clone()).is_some() {
            warn!(
                request_id = %handle.request_id,
                "Request id reused while a call was still in flight; latest registration wins"
            );
        }
        handle
    }

    /// Registers and returns a guard that removes the entry when dropped.
    pub fn track(self: &Arc<Self>, request_id: RequestId, token: CancellationToken) -> CallGuard {
        let handle = self.register(request_id, token);
        CallGuard {
            registry: Arc::clone(self),
            handle,
        }
    }

    /// Cancels the call registered under `request_id` and removes it.
    ///
    /// Returns `false` for unknown ids. Only the caller that wins the removal
    /// cancels, so concurrent cancels take effect at most once.
    pub fn cancel(&self, request_id: &str) -> bool {
        match self.calls.remove(request_id) {
            Some((_, handle)) => {
                handle.token.cancel();
                debug!(
                    request_id = %handle.request_id,
                    elapsed_ms = handle.started_at.elapsed().as_millis() as u64,
                    "Call cancelled"
                );
                true
            }
            None => {
                debug!(request_id, "Cancel ignored: no such call");
                false
            }
        }
    }

    /// Removes `handle`'s registration if it is still the current one.
    pub fn remove(&self, handle: &CallHandle) -> bool {
        self.calls
            .remove_if(&handle.request_id, |_, current| {
                current.generation == handle.generation
            })
            .is_some()
    }

    /// Cancels and removes every registered call, returning how many.
    pub fn cancel_all(&self) -> usize {
        let mut cancelled = 0;
        self.calls.retain(|_, handle| {
            handle.token.cancel();
            cancelled += 1;
            false
        });
        cancelled
    }

    pub fn contains(&self, request_id: &str) -> bool {
        self.calls.contains_key(request_id)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

/// Removes its registration on drop.
#[derive(Debug)]
pub struct CallGuard {
    registry: Arc<CallRegistry>,
    handle: CallHandle,
}

impl CallGuard {
    pub fn handle(&self) -> &CallHandle {
        &self.handle
    }
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        if self.registry.remove(&self.handle) {
            debug!(
                request_id = %self.handle.request_id,
                elapsed_ms = self.handle.started_at.elapsed().as_millis() as u64,
                "Call finished"
            );
        }
    }
}
