//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the remote-content client and the
//! host it is embedded in. Each trait represents a capability the client
//! requires but that is implemented differently per platform.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Single-shot async HTTP transport
//! - [`CallbackContext`](callback::CallbackContext) - The designated context
//!   on which operation results are delivered
//! - [`RendererBackend`](render::RendererBackend) - Native renderer entry
//!   points, owned through the scoped [`Renderer`](render::Renderer)
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Transport
//! implementations must report every failure that prevented a response from
//! arriving as `BridgeError::Transport`; that is the class the retry stage
//! reacts to.
//!
//! ## Thread Safety
//!
//! `HttpClient` and `CallbackContext` require `Send + Sync` so a single
//! instance can be shared by every worker thread.
//!
//! ## Examples
//!
//! ### Implementing HttpClient
//!
//! ```ignore
//! use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct MyHttpClient {
//!     client: reqwest::Client,
//! }
//!
//! #[async_trait]
//! impl HttpClient for MyHttpClient {
//!     async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
//!         // Implementation
//!         todo!()
//!     }
//! }
//! ```

pub mod callback;
pub mod error;
pub mod http;
pub mod render;

pub use error::BridgeError;

// Re-export commonly used types
pub use callback::{CallbackContext, CallbackJob};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use render::{FrameData, RawHandle, Renderer, RendererBackend};
