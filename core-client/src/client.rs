//! API Client
//!
//! Public entry point: every file operation is submitted to a bounded
//! [`WorkerPool`], runs through the request [`Pipeline`], and reports its
//! outcome exactly once on the designated [`CallbackContext`]. Calls are
//! registered in a [`CallRegistry`] from submission until completion so they
//! can be cancelled by [`RequestId`] at any point.
//!
//! ## Usage
//!
//! ```ignore
//! use core_client::ApiClient;
//!
//! let client = ApiClient::with_desktop_transport(config, &credentials, context)?;
//!
//! let id = client.get("users/alice", "profile", |result: Result<String, String>| {
//!     match result {
//!         Ok(content) => println!("{content}"),
//!         Err(error) => eprintln!("{error}"),
//!     }
//! });
//!
//! client.cancel(id.as_str());
//! client.shutdown();
//! ```

use bridge_traits::{CallbackContext, HttpClient};
use core_async::sync::CancellationToken;
use core_async::WorkerPool;
use core_auth::CredentialProvider;
use core_runtime::config::ClientConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::callback::{Completion, ResultCallback};
use crate::error::{ClientError, Result};
use crate::operations::FileOperations;
use crate::pipeline::{CallContext, Pipeline};
use crate::registry::CallRegistry;
use crate::types::RequestId;

/// Thread name prefix of the worker pool.
pub const WORKER_THREAD_NAME: &str = "remote-content-worker";

enum Operation {
    Upload {
        path: String,
        file_name: String,
        content: String,
    },
    Get {
        path: String,
        file_name: String,
    },
    GetDir {
        path: String,
    },
    GetMultiple {
        path: String,
        file_names: Vec<String>,
    },
    Update {
        path: String,
        file_name: String,
        content: String,
    },
    Delete {
        path: String,
        file_name: String,
    },
}

impl Operation {
    /// Prefix of generated request ids.
    fn id_prefix(&self) -> &'static str {
        match self {
            Operation::Upload { .. } => "upload",
            Operation::Get { .. } => "get",
            Operation::GetDir { .. } => "dir",
            Operation::GetMultiple { .. } => "multi-get",
            Operation::Update { .. } => "update",
            Operation::Delete { .. } => "delete",
        }
    }

    async fn run(&self, operations: &FileOperations, call: &CallContext) -> Result<String> {
        match self {
            Operation::Upload {
                path,
                file_name,
                content,
            } => operations.upload(path, file_name, content, call).await,
            Operation::Get { path, file_name } => operations.get(path, file_name, call).await,
            Operation::GetDir { path } => operations.get_dir(path, call).await,
            Operation::GetMultiple { path, file_names } => {
                operations.get_multiple(path, file_names, call).await
            }
            Operation::Update {
                path,
                file_name,
                content,
            } => operations.update(path, file_name, content, call).await,
            Operation::Delete { path, file_name } => {
                operations.delete(path, file_name, call).await
            }
        }
    }
}

struct ClientInner {
    operations: FileOperations,
    registry: Arc<CallRegistry>,
    context: Arc<dyn CallbackContext>,
    closed: AtomicBool,
}

/// Asynchronous client for the file-hosting API.
///
/// Every operation returns immediately with the [`RequestId`] it runs
/// under; the outcome arrives later through the supplied [`ResultCallback`].
pub struct ApiClient {
    inner: Arc<ClientInner>,
    pool: WorkerPool,
}

impl ApiClient {
    /// Builds a client over `transport`.
    ///
    /// Credentials are read once here. Fails when the configuration is
    /// invalid, the credentials cannot be resolved, or the worker pool
    /// cannot start.
    pub fn new(
        config: ClientConfig,
        credentials: &dyn CredentialProvider,
        transport: Arc<dyn HttpClient>,
        context: Arc<dyn CallbackContext>,
    ) -> Result<Self> {
        config.validate()?;
        let credentials = credentials.credentials()?;

        let pipeline = Pipeline::standard(&config, &credentials, transport);
        let operations = FileOperations::new(pipeline, credentials.api_base());
        let pool = WorkerPool::new(config.worker_threads, WORKER_THREAD_NAME).map_err(|err| {
            ClientError::Configuration(format!("failed to start worker pool: {}", err))
        })?;

        info!(
            api_base = %operations.api_base(),
            workers = pool.size(),
            stages = ?operations.pipeline().stage_names(),
            "API client ready"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                operations,
                registry: Arc::new(CallRegistry::new()),
                context,
                closed: AtomicBool::new(false),
            }),
            pool,
        })
    }

    /// Builds a client over the desktop reqwest transport with the
    /// configured timeouts and user agent.
    #[cfg(feature = "desktop-shims")]
    pub fn with_desktop_transport(
        config: ClientConfig,
        credentials: &dyn CredentialProvider,
        context: Arc<dyn CallbackContext>,
    ) -> Result<Self> {
        let transport = bridge_desktop::ReqwestHttpClient::with_timeouts(
            config.connect_timeout,
            config.read_timeout,
            &config.user_agent,
        )
        .map_err(|err| ClientError::Configuration(err.to_string()))?;

        Self::new(config, credentials, Arc::new(transport), context)
    }

    /// Scope for running one operation under a caller-chosen id.
    pub fn call(&self, request_id: impl Into<RequestId>) -> Call<'_> {
        Call {
            client: self,
            request_id: request_id.into(),
        }
    }

    /// Creates `{path}/{file_name}.json` with `content`.
    pub fn upload(
        &self,
        path: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<String>,
        callback: impl ResultCallback,
    ) -> RequestId {
        self.submit_generated(
            Operation::Upload {
                path: path.into(),
                file_name: file_name.into(),
                content: content.into(),
            },
            Box::new(callback),
        )
    }

    /// Reads `file_name` from the listing at `path`.
    pub fn get(
        &self,
        path: impl Into<String>,
        file_name: impl Into<String>,
        callback: impl ResultCallback,
    ) -> RequestId {
        self.submit_generated(
            Operation::Get {
                path: path.into(),
                file_name: file_name.into(),
            },
            Box::new(callback),
        )
    }

    /// Returns the raw directory listing at `path`.
    pub fn get_dir(&self, path: impl Into<String>, callback: impl ResultCallback) -> RequestId {
        self.submit_generated(Operation::GetDir { path: path.into() }, Box::new(callback))
    }

    /// Reads several files from one listing; the payload is a JSON object
    /// keyed by file name.
    pub fn get_multiple<I, S>(
        &self,
        path: impl Into<String>,
        file_names: I,
        callback: impl ResultCallback,
    ) -> RequestId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.submit_generated(
            Operation::GetMultiple {
                path: path.into(),
                file_names: file_names.into_iter().map(Into::into).collect(),
            },
            Box::new(callback),
        )
    }

    /// Replaces the content of an existing file.
    pub fn update(
        &self,
        path: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<String>,
        callback: impl ResultCallback,
    ) -> RequestId {
        self.submit_generated(
            Operation::Update {
                path: path.into(),
                file_name: file_name.into(),
                content: content.into(),
            },
            Box::new(callback),
        )
    }

    /// Deletes an existing file.
    pub fn delete(
        &self,
        path: impl Into<String>,
        file_name: impl Into<String>,
        callback: impl ResultCallback,
    ) -> RequestId {
        self.submit_generated(
            Operation::Delete {
                path: path.into(),
                file_name: file_name.into(),
            },
            Box::new(callback),
        )
    }

    /// Cancels the call running under `request_id`.
    ///
    /// Returns `false` when no such call is in flight. The call's callback
    /// still fires once, with a cancellation failure unless the call had
    /// already produced its outcome.
    pub fn cancel(&self, request_id: &str) -> bool {
        if self.is_shut_down() {
            debug!(request_id, "Cancel ignored: client is shut down");
            return false;
        }
        self.inner.registry.cancel(request_id)
    }

    /// Number of registered in-flight calls.
    pub fn in_flight(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Stops accepting work, cancels every in-flight call and releases the
    /// worker pool. Later calls are no-ops.
    pub fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        let cancelled = self.inner.registry.cancel_all();
        self.pool.shutdown();
        info!(cancelled, "API client shut down");
    }

    fn submit_generated(&self, operation: Operation, callback: Box<dyn ResultCallback>) -> RequestId {
        let request_id = RequestId::generate(operation.id_prefix());
        self.submit(request_id, operation, callback)
    }

    fn submit(
        &self,
        request_id: RequestId,
        operation: Operation,
        callback: Box<dyn ResultCallback>,
    ) -> RequestId {
        let completion = Completion::new(request_id.clone(), callback, self.inner.context.clone());

        if self.is_shut_down() {
            debug!(request_id = %request_id, "Rejected: client is shut down");
            completion.complete(Err(ClientError::Shutdown));
            return request_id;
        }

        let token = CancellationToken::new();
        let guard = self.inner.registry.track(request_id.clone(), token.clone());
        let call = CallContext::new(request_id.clone(), token);
        let inner = Arc::clone(&self.inner);

        let spawned = self.pool.spawn(async move {
            let outcome = operation.run(&inner.operations, &call).await;
            drop(guard);
            completion.complete(outcome);
        });

        if spawned.is_none() {
            warn!(request_id = %request_id, "Worker pool rejected the call");
        }
        request_id
    }
}

impl Drop for ApiClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_base", &self.inner.operations.api_base())
            .field("in_flight", &self.in_flight())
            .field("shut_down", &self.is_shut_down())
            .field("pool", &self.pool)
            .finish()
    }
}

/// One operation under a caller-chosen [`RequestId`].
///
/// Reusing an id that is still in flight displaces the earlier registration:
/// `cancel` then reaches only the latest call.
pub struct Call<'a> {
    client: &'a ApiClient,
    request_id: RequestId,
}

impl Call<'_> {
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn upload(
        self,
        path: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<String>,
        callback: impl ResultCallback,
    ) -> RequestId {
        self.client.submit(
            self.request_id,
            Operation::Upload {
                path: path.into(),
                file_name: file_name.into(),
                content: content.into(),
            },
            Box::new(callback),
        )
    }

    pub fn get(
        self,
        path: impl Into<String>,
        file_name: impl Into<String>,
        callback: impl ResultCallback,
    ) -> RequestId {
        self.client.submit(
            self.request_id,
            Operation::Get {
                path: path.into(),
                file_name: file_name.into(),
            },
            Box::new(callback),
        )
    }

    pub fn get_dir(self, path: impl Into<String>, callback: impl ResultCallback) -> RequestId {
        self.client.submit(
            self.request_id,
            Operation::GetDir { path: path.into() },
            Box::new(callback),
        )
    }

    pub fn get_multiple<I, S>(
        self,
        path: impl Into<String>,
        file_names: I,
        callback: impl ResultCallback,
    ) -> RequestId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.client.submit(
            self.request_id,
            Operation::GetMultiple {
                path: path.into(),
                file_names: file_names.into_iter().map(Into::into).collect(),
            },
            Box::new(callback),
        )
    }

    pub fn update(
        self,
        path: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<String>,
        callback: impl ResultCallback,
    ) -> RequestId {
        self.client.submit(
            self.request_id,
            Operation::Update {
                path: path.into(),
                file_name: file_name.into(),
                content: content.into(),
            },
            Box::new(callback),
        )
    }

    pub fn delete(
        self,
        path: impl Into<String>,
        file_name: impl Into<String>,
        callback: impl ResultCallback,
    ) -> RequestId {
        self.client.submit(
            self.request_id,
            Operation::Delete {
                path: path.into(),
                file_name: file_name.into(),
            },
            Box::new(callback),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::MockHttpClient;
    use async_trait::async_trait;
    use bridge_desktop::ThreadCallbackContext;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{HttpRequest, HttpResponse};
    use core_auth::StaticCredentialProvider;
    use std::sync::mpsc;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    type Outcome = (std::result::Result<String, String>, Option<String>);

    fn capture() -> (impl ResultCallback, mpsc::Receiver<Outcome>) {
        let (tx, rx) = mpsc::channel();
        let callback = move |result: std::result::Result<String, String>| {
            let thread = std::thread::current().name().map(str::to_string);
            let _ = tx.send((result, thread));
        };
        (callback, rx)
    }

    fn client(transport: Arc<dyn HttpClient>) -> ApiClient {
        let config = ClientConfig::builder().worker_threads(2).build().unwrap();
        let credentials = StaticCredentialProvider::new("token", "https://api.example.com/contents");
        let context = ThreadCallbackContext::named("test-callbacks").unwrap();
        ApiClient::new(config, &credentials, transport, Arc::new(context)).unwrap()
    }

    struct Hanging;

    #[async_trait]
    impl HttpClient for Hanging {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            futures::future::pending().await
        }
    }

    #[test]
    fn test_outcome_is_delivered_on_callback_thread() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .withf(|request| request.url == "https://api.example.com/contents/data")
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "[]")));

        let client = client(Arc::new(mock));
        let (callback, rx) = capture();
        let id = client.get_dir("data", callback);

        let (result, thread) = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(result, Ok("[]".to_string()));
        assert_eq!(thread.as_deref(), Some("test-callbacks"));
        assert!(id.as_str().starts_with("dir-"));
        assert_eq!(client.in_flight(), 0);
    }

    #[test]
    fn test_failed_call_is_unregistered() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(404, "")));

        let client = client(Arc::new(mock));
        let (callback, rx) = capture();
        client.call("missing-dir").get_dir("gone", callback);

        let (result, thread) = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(result, Err("Error: HTTP 404: Not Found".to_string()));
        assert_eq!(thread.as_deref(), Some("test-callbacks"));
        assert_eq!(client.in_flight(), 0);
        assert!(!client.cancel("missing-dir"));
    }

    #[test]
    fn test_generated_ids_follow_operation_names() {
        let client = client(Arc::new(Hanging));

        let ids = [
            client.upload("p", "f", "c", capture().0),
            client.get("p", "f", capture().0),
            client.get_multiple("p", ["a", "b"], capture().0),
            client.update("p", "f", "c", capture().0),
            client.delete("p", "f", capture().0),
        ];

        for (id, prefix) in ids.iter().zip(["upload-", "get-", "multi-get-", "update-", "delete-"]) {
            assert!(id.as_str().starts_with(prefix), "{} should start with {}", id, prefix);
        }
        assert_eq!(client.in_flight(), 5);
    }

    #[test]
    fn test_cancel_in_flight_call() {
        let client = client(Arc::new(Hanging));
        let (callback, rx) = capture();

        let id = client.call("slow-1").get("data", "config", callback);
        assert_eq!(id.as_str(), "slow-1");
        assert_eq!(client.in_flight(), 1);

        assert!(client.cancel("slow-1"));
        let (result, _) = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(result, Err("Cancelled: request slow-1 was cancelled".to_string()));

        assert!(!client.cancel("slow-1"));
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn test_cancel_unknown_id_is_noop() {
        let client = client(Arc::new(Hanging));
        assert!(!client.cancel("never-submitted"));
        assert_eq!(client.in_flight(), 0);
    }

    #[test]
    fn test_shutdown_cancels_and_rejects() {
        let client = client(Arc::new(Hanging));
        let (pending, pending_rx) = capture();
        client.call("slow-2").get_dir("data", pending);

        client.shutdown();
        assert!(client.is_shut_down());
        assert_eq!(client.in_flight(), 0);

        let (result, _) = pending_rx.recv_timeout(WAIT).unwrap();
        assert_eq!(result, Err("Cancelled: request slow-2 was cancelled".to_string()));

        let (rejected, rejected_rx) = capture();
        client.get_dir("data", rejected);
        let (result, _) = rejected_rx.recv_timeout(WAIT).unwrap();
        assert_eq!(result, Err("Error: client has been shut down".to_string()));

        assert!(!client.cancel("slow-2"));
        client.shutdown();
    }

    #[test]
    fn test_invalid_api_base_fails_construction() {
        let config = ClientConfig::default();
        let credentials = StaticCredentialProvider::new("token", "ftp://files.example.com");
        let context = Arc::new(ThreadCallbackContext::new().unwrap());

        let err = ApiClient::new(config, &credentials, Arc::new(Hanging), context).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Application);
        assert!(matches!(err, ClientError::Configuration(_)));
    }
}
