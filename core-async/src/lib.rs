//! Async abstraction layer for the remote-content client.
//!
//! Every other crate in the workspace reaches Tokio through this crate, so the
//! executor can be swapped or instrumented in one place.
//!
//! # Modules
//!
//! - `task`: Task spawning and join handles
//! - `time`: Sleep, timeout and the runtime-aware `Instant`
//! - `sync`: Channels, locks and [`CancellationToken`](sync::CancellationToken)
//! - `runtime`: The bounded [`WorkerPool`](runtime::WorkerPool) operations run on
//!
//! # Examples
//!
//! ```rust
//! use core_async::runtime::WorkerPool;
//! use core_async::time::{sleep, Duration};
//!
//! let pool = WorkerPool::new(2, "example-worker").unwrap();
//! let handle = pool.spawn(async {
//!     sleep(Duration::from_millis(1)).await;
//!     42
//! });
//! assert!(handle.is_some());
//! pool.shutdown();
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use runtime::WorkerPool;
pub use task::spawn;
pub use time::{sleep, Duration, Instant};
