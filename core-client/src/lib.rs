//! # Core Client
//!
//! Resilient client for a file-hosting REST API.
//!
//! - [`ApiClient`] - file operations (upload, get, get_dir, get_multiple,
//!   update, delete) dispatched on a bounded worker pool, with cancellation
//!   by request id and orderly shutdown
//! - [`pipeline`] - the fixed interceptor chain every request passes through
//! - [`registry`] - concurrent map of in-flight calls
//! - [`callback`] - exactly-once result delivery onto the host's callback
//!   context
//!
//! Failures reach callbacks as plain strings produced by [`ClientError`]'s
//! `Display`: parse errors verbatim, transport errors prefixed with
//! `Network error:`, cancellations with `Cancelled:`, everything else with
//! `Error:` (apart from the bare `File not found`).

pub mod callback;
pub mod client;
pub mod error;
pub mod operations;
pub mod pipeline;
pub mod registry;
pub mod types;

pub use callback::{Completion, ResultCallback};
pub use client::{ApiClient, Call, WORKER_THREAD_NAME};
pub use error::{ClientError, ErrorKind, Result};
pub use operations::FileOperations;
pub use pipeline::{CallContext, Pipeline, Stage};
pub use registry::{CallGuard, CallHandle, CallRegistry};
pub use types::{DirectoryEntry, RequestId, WriteBody};
