//! Time utilities.
//!
//! `Instant` is Tokio's, so elapsed-time measurements follow a paused test
//! clock the same way `sleep` does.

pub use std::time::Duration;
pub use tokio::time::{error::Elapsed, sleep, timeout, Instant};
