//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Reqwest-based HTTP transport
///
/// Performs exactly one exchange per `execute` call:
/// - Connection pooling via reqwest
/// - TLS via rustls
/// - Fixed connect timeout and a per-read timeout
///
/// Retrying is left to the request pipeline.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with default timeouts (15 s connect, 30 s read)
    pub fn new() -> Result<Self> {
        Self::with_timeouts(
            DEFAULT_CONNECT_TIMEOUT,
            DEFAULT_READ_TIMEOUT,
            concat!("remote-content/", env!("CARGO_PKG_VERSION")),
        )
    }

    /// Create a new HTTP client with custom timeouts and user agent.
    ///
    /// `read_timeout` bounds each read from the connection, not the whole
    /// exchange: a slow body that keeps arriving is not cut off.
    pub fn with_timeouts(
        connect_timeout: Duration,
        read_timeout: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .pool_max_idle_per_host(10)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                BridgeError::NotAvailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Convert bridge HttpMethod to reqwest Method
    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
        }
    }

    /// Build reqwest request from bridge request
    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }
}

/// Classify a reqwest failure. Anything that stopped a response from
/// arriving is a transport failure; a request that could not even be built
/// is not.
fn map_error(err: reqwest::Error) -> BridgeError {
    if err.is_builder() {
        return BridgeError::OperationFailed(format!("Invalid request: {}", err));
    }

    let message = if err.is_timeout() {
        format!("timeout: {}", err)
    } else if err.is_connect() {
        format!("failed to connect: {}", err)
    } else {
        err.to_string()
    };
    BridgeError::Transport(message)
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();

        let response = self.build_request(request).send().await.map_err(|e| {
            let mapped = map_error(e);
            warn!(%method, %url, error = %mapped, "HTTP exchange failed");
            mapped
        })?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        // A connection dropped mid-body is still a transport failure.
        let body = response.bytes().await.map_err(map_error)?;

        debug!(%method, %url, status, bytes = body.len(), "HTTP exchange completed");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
