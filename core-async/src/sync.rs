//! Synchronization primitives.

pub use tokio::sync::{mpsc, oneshot, Mutex, Notify, RwLock, Semaphore};
pub use tokio_util::sync::{CancellationToken, DropGuard, WaitForCancellationFuture};
