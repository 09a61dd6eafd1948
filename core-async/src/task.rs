//! Task spawning.

pub use tokio::task::{spawn_blocking, yield_now, JoinError, JoinHandle};

/// Spawns a future onto the current runtime.
///
/// # Panics
///
/// Panics when called outside a runtime context. Use
/// [`WorkerPool::spawn`](crate::runtime::WorkerPool::spawn) from synchronous
/// code.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}
