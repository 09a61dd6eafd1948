use bridge_traits::error::Result;
use bridge_traits::http::{HttpRequest, HttpResponse};
use core_async::time::Instant;
use tracing::{debug, warn};

use super::Next;

/// Logs each exchange at basic verbosity. Headers, bodies and query strings
/// are never logged, and nothing passing through is changed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticStage;

impl DiagnosticStage {
    pub async fn handle(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
        let method = request.method;
        let url = loggable_url(&request.url).to_string();
        let started = Instant::now();

        debug!(request_id = %next.call().request_id(), %method, %url, "--> request");

        let result = next.run(request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => debug!(
                request_id = %next.call().request_id(),
                %method,
                %url,
                status = response.status,
                elapsed_ms,
                bytes = response.body.len(),
                "<-- response"
            ),
            Err(err) => warn!(
                request_id = %next.call().request_id(),
                %method,
                %url,
                elapsed_ms,
                error = %err,
                "<-- failed"
            ),
        }

        result
    }
}

/// Scheme, host and path only; query and fragment may carry tokens.
fn loggable_url(url: &str) -> &str {
    match url.find(['?', '#']) {
        Some(end) => &url[..end],
        None => url,
    }
}
