use bridge_traits::error::{BridgeError, Result};
use bridge_traits::http::{HttpRequest, HttpResponse};
use core_async::time::{sleep, Duration};
use tracing::{debug, warn};

use super::Next;

/// Bounded retry of transport failures.
///
/// Makes at most `max_retries + 1` attempts. Before retry number *n* it
/// waits `n × base_delay`. Any completed response, successful or not, is
/// returned as-is; only [`BridgeError::Transport`] is retried. Cancellation
/// during the wait ends the call with [`BridgeError::Cancelled`].
#[derive(Debug, Clone)]
pub struct RetryStage {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryStage {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Wait before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    pub async fn handle(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
        let mut retries = 0;

        loop {
            match next.run(request.clone()).await {
                Ok(response) => {
                    if !response.is_success() {
                        debug!(
                            request_id = %next.call().request_id(),
                            status = response.status,
                            "Unsuccessful status is returned without retrying"
                        );
                    }
                    return Ok(response);
                }
                Err(BridgeError::Transport(message)) if retries < self.max_retries => {
                    retries += 1;
                    let delay = self.delay_for(retries);
                    warn!(
                        request_id = %next.call().request_id(),
                        url = %request.url,
                        attempt = retries,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %message,
                        "Transport failure, retrying"
                    );

                    tokio::select! {
                        biased;
                        _ = next.call().token().cancelled() => return Err(BridgeError::Cancelled),
                        _ = sleep(delay) => {}
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{call, MockHttpClient};
    use super::super::{Pipeline, Stage};
    use super::*;
    use core_async::time::Instant;
    use std::sync::{Arc, Mutex};

    fn pipeline(max_retries: u32, mock: MockHttpClient) -> Pipeline {
        Pipeline::new(
            vec![Stage::Retry(RetryStage::new(max_retries, Duration::from_millis(1000)))],
            Arc::new(mock),
        )
    }

    fn request() -> HttpRequest {
        HttpRequest::get("https://api.example.com/data")
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_invokes_transport_once() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "ok")));

        let started = Instant::now();
        let response = pipeline(3, mock).execute(request(), &call("get-1")).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_attempts_n_plus_one_times_with_linear_backoff() {
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let recorder = attempts.clone();

        let mut mock = MockHttpClient::new();
        mock.expect_execute().times(4).returning(move |_| {
            recorder.lock().unwrap().push(Instant::now());
            Err(BridgeError::Transport("connection reset".into()))
        });

        let started = Instant::now();
        let err = pipeline(3, mock)
            .execute(request(), &call("get-2"))
            .await
            .unwrap_err();

        assert_eq!(err, BridgeError::Transport("connection reset".into()));

        let attempts = attempts.lock().unwrap();
        let gaps: Vec<Duration> = attempts.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(
            gaps,
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(3000),
            ]
        );
        assert_eq!(attempts[0] - started, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failure() {
        let mut seq = mockall::Sequence::new();
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(BridgeError::Transport("timeout".into())));
        mock.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(HttpResponse::new(200, "second")));

        let response = pipeline(3, mock).execute(request(), &call("get-3")).await.unwrap();
        assert_eq!(response.text(), "second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_success_response_is_not_retried() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(500, "boom")));

        let response = pipeline(3, mock).execute(request(), &call("get-4")).await.unwrap();
        assert_eq!(response.status, 500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_propagates_first_failure() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::Transport("refused".into())));

        let err = pipeline(0, mock).execute(request(), &call("get-5")).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_failures_are_not_retried() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::OperationFailed("bad header".into())));

        let err = pipeline(3, mock).execute(request(), &call("get-6")).await.unwrap_err();
        assert_eq!(err, BridgeError::OperationFailed("bad header".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_backoff_stops_retrying() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::Transport("unreachable".into())));

        let pipeline = Arc::new(pipeline(3, mock));
        let call = call("get-7");
        let token = call.token().clone();

        let task = tokio::spawn({
            let pipeline = pipeline.clone();
            async move { pipeline.execute(request(), &call).await }
        });

        // First attempt fails immediately; the stage is now in its 1 s wait.
        tokio::time::sleep(Duration::from_millis(500)).await;
        token.cancel();

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err, BridgeError::Cancelled);
    }

    #[test]
    fn test_delay_grows_with_attempt() {
        let stage = RetryStage::new(3, Duration::from_millis(1000));
        assert!(stage.delay_for(1) <= stage.delay_for(2));
        assert_eq!(stage.delay_for(3), Duration::from_millis(3000));
    }
}
