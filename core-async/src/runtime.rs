//! Runtime utilities that abstract over the underlying async executor.
//!
//! [`WorkerPool`] owns a dedicated multi-thread Tokio runtime with a fixed
//! number of named worker threads. Submitting work never blocks the caller,
//! and shutting the pool down never waits for in-flight tasks: they are
//! dropped at their next suspension point.

use parking_lot::Mutex;
use std::future::Future;
use std::io;
use tracing::{debug, info};

pub use tokio::runtime::{Builder, Handle, Runtime};

use crate::task::JoinHandle;

/// Runs the provided future to completion using a lightweight runtime.
pub fn block_on<F>(future: F) -> io::Result<F::Output>
where
    F: Future,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}

/// Bounded pool of worker threads backed by its own Tokio runtime.
pub struct WorkerPool {
    runtime: Mutex<Option<Runtime>>,
    size: usize,
    thread_name: String,
}

impl WorkerPool {
    /// Builds a pool with exactly `size` worker threads named `thread_name`.
    ///
    /// `size` is clamped to at least one thread.
    pub fn new(size: usize, thread_name: impl Into<String>) -> io::Result<Self> {
        let size = size.max(1);
        let thread_name = thread_name.into();
        let runtime = Builder::new_multi_thread()
            .worker_threads(size)
            .thread_name(thread_name.clone())
            .enable_all()
            .build()?;

        info!(workers = size, thread_name = %thread_name, "Worker pool started");

        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
            size,
            thread_name,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// Submits a future to the pool.
    ///
    /// Returns `None` once the pool has been shut down; the future is dropped
    /// without being polled.
    pub fn spawn<F>(&self, future: F) -> Option<JoinHandle<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let guard = self.runtime.lock();
        match guard.as_ref() {
            Some(runtime) => Some(runtime.spawn(future)),
            None => {
                debug!(thread_name = %self.thread_name, "Spawn rejected: worker pool is shut down");
                None
            }
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.runtime.lock().is_none()
    }

    /// Stops the runtime without waiting for running tasks. Idempotent.
    pub fn shutdown(&self) {
        let runtime = self.runtime.lock().take();
        if let Some(runtime) = runtime {
            runtime.shutdown_background();
            info!(thread_name = %self.thread_name, "Worker pool shut down");
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size)
            .field("thread_name", &self.thread_name)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
