//! # Request Pipeline
//!
//! Every outbound request passes through a fixed, ordered chain of stages
//! before it reaches the transport:
//!
//! 1. [`CacheStage`] - stamps a `Cache-Control: max-age` directive on GET
//!    responses and optionally serves fresh hits from a [`ResponseCache`]
//! 2. [`RetryStage`] - retries transport failures with linear backoff
//! 3. [`AuthStage`] - sets the bearer `Authorization` header
//! 4. [`DiagnosticStage`] - logs method, URL, outcome and latency
//!
//! ## Overview
//!
//! A stage receives the request and a [`Next`] continuation covering the
//! remaining stages and the transport. It may rewrite the request before
//! calling `next.run`, call it several times (retry), skip it entirely
//! (cache hit), and rewrite the response afterwards. The stage set is closed,
//! so stages are variants of [`Stage`] rather than trait objects.
//!
//! The transport call at the end of the chain races the call's
//! cancellation token; a cancelled call resolves to
//! [`BridgeError::Cancelled`] without waiting for the network.

mod auth;
mod cache;
mod diagnostic;
mod retry;

pub use auth::AuthStage;
pub use cache::{CacheStage, ResponseCache};
pub use diagnostic::DiagnosticStage;
pub use retry::RetryStage;

use bridge_traits::error::{BridgeError, Result};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use core_async::sync::CancellationToken;
use core_auth::Credentials;
use core_runtime::config::ClientConfig;
use futures::future::BoxFuture;
use std::sync::Arc;

use crate::types::RequestId;

/// Per-call state visible to every stage.
#[derive(Debug, Clone)]
pub struct CallContext {
    request_id: RequestId,
    token: CancellationToken,
}

impl CallContext {
    pub fn new(request_id: RequestId, token: CancellationToken) -> Self {
        Self { request_id, token }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

pub enum Stage {
    Cache(CacheStage),
    Retry(RetryStage),
    Auth(AuthStage),
    Diagnostic(DiagnosticStage),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Cache(_) => "cache",
            Stage::Retry(_) => "retry",
            Stage::Auth(_) => "auth",
            Stage::Diagnostic(_) => "diagnostic",
        }
    }

    fn handle<'a>(&'a self, request: HttpRequest, next: Next<'a>) -> BoxFuture<'a, Result<HttpResponse>> {
        match self {
            Stage::Cache(stage) => Box::pin(stage.handle(request, next)),
            Stage::Retry(stage) => Box::pin(stage.handle(request, next)),
            Stage::Auth(stage) => Box::pin(stage.handle(request, next)),
            Stage::Diagnostic(stage) => Box::pin(stage.handle(request, next)),
        }
    }
}

/// Continuation over the stages after the current one.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    stages: &'a [Stage],
    transport: &'a dyn HttpClient,
    call: &'a CallContext,
}

impl<'a> Next<'a> {
    pub fn call(&self) -> &'a CallContext {
        self.call
    }

    /// Runs the rest of the chain. Can be invoked more than once.
    pub fn run(self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse>> {
        match self.stages.split_first() {
            Some((stage, rest)) => stage.handle(
                request,
                Next {
                    stages: rest,
                    ..self
                },
            ),
            None => Box::pin(dispatch(self.transport, request, self.call)),
        }
    }
}

async fn dispatch(
    transport: &dyn HttpClient,
    request: HttpRequest,
    call: &CallContext,
) -> Result<HttpResponse> {
    if call.is_cancelled() {
        return Err(BridgeError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = call.token().cancelled() => Err(BridgeError::Cancelled),
        result = transport.execute(request) => result,
    }
}

/// Ordered stage chain in front of a shared transport.
pub struct Pipeline {
    stages: Vec<Stage>,
    transport: Arc<dyn HttpClient>,
}

impl Pipeline {
    /// Chain with an explicit stage order.
    pub fn new(stages: Vec<Stage>, transport: Arc<dyn HttpClient>) -> Self {
        Self { stages, transport }
    }

    /// The standard chain: cache, retry, auth, diagnostic.
    pub fn standard(
        config: &ClientConfig,
        credentials: &Credentials,
        transport: Arc<dyn HttpClient>,
    ) -> Self {
        Self::new(
            vec![
                Stage::Cache(CacheStage::new(
                    config.cache_max_age,
                    config.response_cache_capacity,
                )),
                Stage::Retry(RetryStage::new(config.max_retries, config.retry_base_delay)),
                Stage::Auth(AuthStage::new(credentials.token())),
                Stage::Diagnostic(DiagnosticStage),
            ],
            transport,
        )
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }

    pub async fn execute(&self, request: HttpRequest, call: &CallContext) -> Result<HttpResponse> {
        Next {
            stages: &self.stages,
            transport: self.transport.as_ref(),
            call,
        }
        .run(request)
        .await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        pub HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
        }
    }

    pub fn call(id: &str) -> CallContext {
        CallContext::new(RequestId::from(id), CancellationToken::new())
    }
}
