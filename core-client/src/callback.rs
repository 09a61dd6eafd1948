//! Result delivery onto the designated callback context.
//!
//! Operations run on the worker pool, but their outcome is handed to the
//! caller through [`CallbackContext::post`], never on the worker thread. A
//! [`Completion`] owns the caller's [`ResultCallback`] for the lifetime of the
//! task and guarantees it fires exactly once: either through
//! [`Completion::complete`] or, if the task is torn down first, from `Drop`.

use bridge_traits::CallbackContext;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::types::RequestId;

/// Receiver of an operation's single terminal outcome.
pub trait ResultCallback: Send + 'static {
    fn on_success(self: Box<Self>, content: String);
    fn on_failure(self: Box<Self>, error: String);
}

impl<F> ResultCallback for F
where
    F: FnOnce(std::result::Result<String, String>) + Send + 'static,
{
    fn on_success(self: Box<Self>, content: String) {
        (*self)(Ok(content))
    }

    fn on_failure(self: Box<Self>, error: String) {
        (*self)(Err(error))
    }
}

/// Exactly-once delivery guard for one call.
pub struct Completion {
    request_id: RequestId,
    callback: Option<Box<dyn ResultCallback>>,
    context: Arc<dyn CallbackContext>,
}

impl Completion {
    pub fn new(
        request_id: RequestId,
        callback: Box<dyn ResultCallback>,
        context: Arc<dyn CallbackContext>,
    ) -> Self {
        Self {
            request_id,
            callback: Some(callback),
            context,
        }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Posts `outcome` to the callback context.
    pub fn complete(mut self, outcome: Result<String>) {
        match &outcome {
            Ok(content) => debug!(
                request_id = %self.request_id,
                bytes = content.len(),
                "Call succeeded"
            ),
            Err(err) => debug!(
                request_id = %self.request_id,
                kind = ?err.kind(),
                error = %err,
                "Call failed"
            ),
        }
        self.deliver(outcome);
    }

    fn deliver(&mut self, outcome: Result<String>) {
        let Some(callback) = self.callback.take() else {
            return;
        };

        let outcome = outcome.map_err(|err| err.to_string());
        self.context.post(Box::new(move || match outcome {
            Ok(content) => callback.on_success(content),
            Err(error) => callback.on_failure(error),
        }));
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.callback.is_none() {
            return;
        }

        let err = if std::thread::panicking() {
            ClientError::Aborted
        } else {
            ClientError::Cancelled {
                request_id: self.request_id.clone(),
            }
        };
        warn!(request_id = %self.request_id, error = %err, "Call dropped before completing");
        self.deliver(Err(err));
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("request_id", &self.request_id)
            .field("delivered", &self.callback.is_none())
            .finish()
    }
}
