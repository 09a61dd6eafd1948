//! Desktop callback contexts
//!
//! Two ways to give the client a designated delivery context on desktop:
//!
//! - [`ThreadCallbackContext`] owns one named thread that drains posted jobs
//!   in order, the desktop counterpart of a UI looper.
//! - [`QueuedCallbackContext`] only queues; the host pumps it from its own
//!   event loop with [`QueuedCallbackContext::run_pending`].

use bridge_traits::callback::{CallbackContext, CallbackJob};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread::{self, JoinHandle, ThreadId};
use tracing::{debug, error, warn};

pub const DEFAULT_CALLBACK_THREAD: &str = "callback-context";

/// Runs posted jobs sequentially on one dedicated thread.
///
/// Dropping the context stops accepting jobs, lets the thread finish the
/// jobs already queued and joins it.
pub struct ThreadCallbackContext {
    sender: Mutex<Option<mpsc::Sender<CallbackJob>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
    thread_id: ThreadId,
    name: String,
}

impl ThreadCallbackContext {
    pub fn new() -> io::Result<Self> {
        Self::named(DEFAULT_CALLBACK_THREAD)
    }

    pub fn named(name: impl Into<String>) -> io::Result<Self> {
        let name = name.into();
        let (sender, receiver) = mpsc::channel::<CallbackJob>();

        let thread = thread::Builder::new().name(name.clone()).spawn(move || {
            for job in receiver {
                // A panicking callback must not take the delivery thread down.
                if catch_unwind(AssertUnwindSafe(job)).is_err() {
                    error!("Callback panicked; continuing with the next one");
                }
            }
        })?;

        debug!(thread_name = %name, "Callback thread started");

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            thread_id: thread.thread().id(),
            thread: Mutex::new(Some(thread)),
            name,
        })
    }

    /// Identifier of the delivery thread.
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    pub fn thread_name(&self) -> &str {
        &self.name
    }
}

impl CallbackContext for ThreadCallbackContext {
    fn post(&self, job: CallbackJob) {
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(sender) => {
                if sender.send(job).is_err() {
                    warn!(thread_name = %self.name, "Callback thread is gone; job dropped");
                }
            }
            None => warn!(thread_name = %self.name, "Callback context closed; job dropped"),
        }
    }
}

impl Drop for ThreadCallbackContext {
    fn drop(&mut self) {
        self.sender.lock().take();
        let handle = self.thread.lock().take();
        if let Some(handle) = handle {
            // Joining from the delivery thread itself would never return.
            if thread::current().id() != self.thread_id && handle.join().is_err() {
                error!(thread_name = %self.name, "Callback thread terminated abnormally");
            }
        }
    }
}

impl std::fmt::Debug for ThreadCallbackContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadCallbackContext")
            .field("name", &self.name)
            .field("thread_id", &self.thread_id)
            .finish()
    }
}

/// Queues posted jobs until the host calls [`run_pending`](Self::run_pending).
#[derive(Default)]
pub struct QueuedCallbackContext {
    queue: Mutex<VecDeque<CallbackJob>>,
}

impl QueuedCallbackContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Runs every job queued so far on the calling thread, in posting order,
    /// and returns how many ran. Jobs posted while draining wait for the
    /// next call.
    pub fn run_pending(&self) -> usize {
        let jobs: Vec<CallbackJob> = self.queue.lock().drain(..).collect();
        let count = jobs.len();
        for job in jobs {
            job();
        }
        count
    }
}

impl CallbackContext for QueuedCallbackContext {
    fn post(&self, job: CallbackJob) {
        self.queue.lock().push_back(job);
    }
}
