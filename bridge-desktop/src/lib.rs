//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` with rustls
//! - `CallbackContext` as a dedicated delivery thread or a host-pumped queue
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, ThreadCallbackContext};
//! use std::sync::Arc;
//!
//! let transport = Arc::new(ReqwestHttpClient::new()?);
//! let callbacks = Arc::new(ThreadCallbackContext::new()?);
//! // Hand both to the API client
//! ```

mod callback;
mod http;

pub use callback::{QueuedCallbackContext, ThreadCallbackContext, DEFAULT_CALLBACK_THREAD};
pub use http::ReqwestHttpClient;
