//! Remote content client.
//!
//! Facade over the workspace crates: host applications depend on
//! `remote-content` and get the client, its configuration and logging, the
//! credential providers and the bridge traits from one place. The
//! `desktop-shims` feature (on by default) adds the reqwest transport and the
//! desktop callback contexts from `bridge-desktop`.
//!
//! ```ignore
//! use remote_content::{init_logging, ApiClient, ClientConfig, EnvCredentialProvider, LoggingConfig};
//! use remote_content::desktop::ThreadCallbackContext;
//! use std::sync::Arc;
//!
//! init_logging(LoggingConfig::default())?;
//!
//! let context = Arc::new(ThreadCallbackContext::new()?);
//! let client = ApiClient::with_desktop_transport(
//!     ClientConfig::default(),
//!     &EnvCredentialProvider::new(),
//!     context,
//! )?;
//!
//! client.get_dir("users", |result: Result<String, String>| println!("{:?}", result));
//! ```

pub use core_client::{
    ApiClient, Call, ClientError, DirectoryEntry, ErrorKind, RequestId, Result, ResultCallback,
};
pub use core_auth::{
    AuthError, CredentialProvider, Credentials, EnvCredentialProvider, StaticCredentialProvider,
};
pub use core_runtime::{
    init_logging, ClientConfig, ClientConfigBuilder, LogFormat, LogLevel, LoggingConfig,
};
pub use bridge_traits::{
    BridgeError, CallbackContext, CallbackJob, HttpClient, HttpMethod, HttpRequest, HttpResponse,
};

/// The external renderer boundary.
pub mod render {
    pub use bridge_traits::render::*;
}

/// Desktop transport and callback contexts.
#[cfg(feature = "desktop-shims")]
pub mod desktop {
    pub use bridge_desktop::{QueuedCallbackContext, ReqwestHttpClient, ThreadCallbackContext};
}
