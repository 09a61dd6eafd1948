//! End-to-end tests: ApiClient over the reqwest transport against a local
//! mock server.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bridge_desktop::ThreadCallbackContext;
use core_auth::StaticCredentialProvider;
use core_client::{ApiClient, ResultCallback};
use core_runtime::config::ClientConfig;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::timeout;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CALLBACK_THREAD: &str = "app-main";
const WAIT: Duration = Duration::from_secs(10);

type Outcome = (Result<String, String>, Option<String>);

fn capture() -> (impl ResultCallback, oneshot::Receiver<Outcome>) {
    let (tx, rx) = oneshot::channel();
    let callback = move |result: Result<String, String>| {
        let thread = std::thread::current().name().map(str::to_string);
        let _ = tx.send((result, thread));
    };
    (callback, rx)
}

async fn outcome(rx: oneshot::Receiver<Outcome>) -> Outcome {
    timeout(WAIT, rx)
        .await
        .expect("callback was not delivered in time")
        .expect("callback dropped without an outcome")
}

fn client(api_base: &str) -> ApiClient {
    let config = ClientConfig::builder()
        .worker_threads(2)
        .retry_base_delay(Duration::from_millis(10))
        .connect_timeout(Duration::from_secs(2))
        .read_timeout(Duration::from_secs(20))
        .build()
        .unwrap();
    let credentials = StaticCredentialProvider::new("test-token", api_base);
    let context = ThreadCallbackContext::named(CALLBACK_THREAD).unwrap();

    ApiClient::with_desktop_transport(config, &credentials, Arc::new(context)).unwrap()
}

fn listing(server: &MockServer) -> Value {
    json!([
        {"type": "dir", "name": "archive", "download_url": null},
        {"type": "file", "name": "a.json", "download_url": format!("{}/raw/a.json", server.uri())},
        {"type": "file", "name": "config.json", "download_url": format!("{}/raw/config.json", server.uri())},
    ])
}

async fn mount_listing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/contents/data"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(server)))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_get_downloads_matching_file() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    Mock::given(method("GET"))
        .and(path("/raw/config.json"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"theme":"dark"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&format!("{}/contents", server.uri()));
    let (callback, rx) = capture();
    client.get("data", "config", callback);

    let (result, thread) = outcome(rx).await;
    assert_eq!(result, Ok(r#"{"theme":"dark"}"#.to_string()));
    assert_eq!(thread.as_deref(), Some(CALLBACK_THREAD));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_get_missing_file_reports_not_found() {
    let server = MockServer::start().await;
    mount_listing(&server).await;

    let client = client(&format!("{}/contents", server.uri()));
    let (callback, rx) = capture();
    client.get("data", "missing", callback);

    let (result, _) = outcome(rx).await;
    assert_eq!(result, Err("File not found".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_get_multiple_skips_missing_names() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    Mock::given(method("GET"))
        .and(path("/raw/a.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("alpha"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&format!("{}/contents", server.uri()));
    let (callback, rx) = capture();
    client.get_multiple("data", ["a", "missing"], callback);

    let (result, _) = outcome(rx).await;
    let value: Value = serde_json::from_str(&result.unwrap()).unwrap();
    assert_eq!(value, json!({"a": "alpha"}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_get_dir_returns_listing_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contents/data"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[ ]\n"))
        .mount(&server)
        .await;

    let client = client(&format!("{}/contents", server.uri()));
    let (callback, rx) = capture();
    let id = client.get_dir("data", callback);

    let (result, _) = outcome(rx).await;
    assert_eq!(result, Ok("[ ]\n".to_string()));
    assert!(id.as_str().starts_with("dir-"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_upload_sends_create_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/contents/notes/today.json"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({
            "message": "Create notes: today",
            "content": STANDARD.encode("hello"),
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&format!("{}/contents", server.uri()));
    let (callback, rx) = capture();
    client.upload("notes", "today", "hello", callback);

    let (result, _) = outcome(rx).await;
    assert_eq!(result, Ok("File uploaded successfully".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_update_fetches_sha_before_writing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contents/notes/today.json"))
        .and(header("cache-control", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sha": "abc123"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/contents/notes/today.json"))
        .and(body_partial_json(json!({
            "message": "Update notes: today",
            "content": STANDARD.encode("v2"),
            "sha": "abc123",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&format!("{}/contents", server.uri()));
    let (callback, rx) = capture();
    client.update("notes", "today", "v2", callback);

    let (result, _) = outcome(rx).await;
    assert_eq!(result, Ok("File updated successfully".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_update_stops_when_metadata_fetch_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contents/notes/today.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&format!("{}/contents", server.uri()));
    let (callback, rx) = capture();
    client.update("notes", "today", "v2", callback);

    let (result, _) = outcome(rx).await;
    assert_eq!(result, Err("Error: Failed to get file: HTTP 404".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_delete_sends_sha_in_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contents/notes/today.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sha": "deadbeef"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/contents/notes/today.json"))
        .and(body_json(json!({
            "message": "Delete notes: today",
            "content": STANDARD.encode("deadbeef"),
            "sha": "deadbeef",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&format!("{}/contents", server.uri()));
    let (callback, rx) = capture();
    client.delete("notes", "today", callback);

    let (result, _) = outcome(rx).await;
    assert_eq!(result, Ok("File deleted successfully".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unsuccessful_status_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contents/data"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&format!("{}/contents", server.uri()));
    let (callback, rx) = capture();
    client.get_dir("data", callback);

    let (result, _) = outcome(rx).await;
    assert_eq!(result, Err("Error: HTTP 500: Internal Server Error".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unreachable_server_is_network_error() {
    let client = client("http://127.0.0.1:1/contents");
    let (callback, rx) = capture();
    client.get_dir("data", callback);

    let (result, _) = outcome(rx).await;
    let error = result.unwrap_err();
    assert!(error.starts_with("Network error: "), "unexpected error: {}", error);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contents/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let client = client(&format!("{}/contents", server.uri()));
    let (callback, rx) = capture();
    client.call("slow-listing").get_dir("slow", callback);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(client.cancel("slow-listing"));

    let (result, thread) = outcome(rx).await;
    assert_eq!(
        result,
        Err("Cancelled: request slow-listing was cancelled".to_string())
    );
    assert_eq!(thread.as_deref(), Some(CALLBACK_THREAD));
    assert_eq!(client.in_flight(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_rejects_new_work() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let client = client(&format!("{}/contents", server.uri()));
    let (pending, pending_rx) = capture();
    client.call("pending").get_dir("data", pending);

    client.shutdown();

    let (result, _) = outcome(pending_rx).await;
    assert_eq!(result, Err("Cancelled: request pending was cancelled".to_string()));

    let (late, late_rx) = capture();
    client.get("data", "config", late);
    let (result, _) = outcome(late_rx).await;
    assert_eq!(result, Err("Error: client has been shut down".to_string()));

    assert!(!client.cancel("pending"));
    client.shutdown();
}
