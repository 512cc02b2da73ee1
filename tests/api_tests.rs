//! ApiClient and command execution against a stub backend.
//!
//! The stub is a `tiny_http` server on an ephemeral port that answers from a
//! fixed route table and records every request it sees.

use std::io::Read;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bin_console::api::ApiClient;
use bin_console::console::{self, Command, ConsoleEvent};
use bin_console::ConsoleError;
use serde_json::{json, Value};
use tiny_http::{Header, Response, Server};

type Route = fn(method: &str, url: &str) -> (u16, String);

#[derive(Debug, Clone, PartialEq)]
struct Seen {
    method: String,
    url: String,
    body: String,
}

struct Stub {
    base_url: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Stub {
    fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url, Duration::from_secs(5)).unwrap()
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

fn spawn_stub(route: Route) -> Stub {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    std::thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            let method = request.method().to_string();
            let url = request.url().to_string();
            log.lock().unwrap().push(Seen {
                method: method.clone(),
                url: url.clone(),
                body,
            });

            let (status, payload) = route(&method, &url);
            let response = Response::from_string(payload)
                .with_status_code(status)
                .with_header(Header::from_bytes("Content-Type", "application/json").unwrap());
            let _ = request.respond(response);
        }
    });

    Stub {
        base_url: format!("http://127.0.0.1:{}/", port),
        seen,
    }
}

fn backend(method: &str, url: &str) -> (u16, String) {
    match (method, url) {
        ("GET", "/api/bins") => (
            200,
            json!([
                {"id": "b1", "url": "/bin/b1", "created": "2025-01-01T00:00:00+00:00"},
                {"id": "b2", "url": "/bin/b2", "created": "unknown"}
            ])
            .to_string(),
        ),
        ("GET", "/api/bins/b1") => (
            200,
            json!({
                "id": "b1",
                "url": "/bin/b1",
                "response": {"status": 202, "body": {"ok": true}},
                "recent_logs": [{
                    "timestamp": "2025-01-01T00:00:00+00:00",
                    "method": "POST",
                    "headers": {"host": "localhost"},
                    "body": {"n": 1}
                }]
            })
            .to_string(),
        ),
        ("PUT", "/api/bins/b1/response") => (200, String::new()),
        ("GET", "/create") => (200, "Bin ID: b1\nURL: /bin/b1".to_string()),
        _ => (404, json!({"error": "Bin not found"}).to_string()),
    }
}

fn failing(_method: &str, _url: &str) -> (u16, String) {
    (500, "boom".to_string())
}

#[tokio::test]
async fn lists_bins() {
    let stub = spawn_stub(backend);
    let bins = stub.client().list_bins().await.unwrap();

    assert_eq!(bins.len(), 2);
    assert_eq!(bins[0].id, "b1");
    assert_eq!(bins[1].created, "unknown");
    assert_eq!(stub.seen()[0].url, "/api/bins");
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let stub = spawn_stub(failing);
    let err = stub.client().list_bins().await.unwrap_err();
    assert!(matches!(err, ConsoleError::Status { status: 500, .. }), "got {err:?}");
}

#[tokio::test]
async fn fetches_detail_with_logs() {
    let stub = spawn_stub(backend);
    let detail = stub.client().get_bin_detail("b1").await.unwrap();

    assert_eq!(detail.response.status, 202);
    assert_eq!(detail.response.body, json!({"ok": true}));
    assert_eq!(detail.recent_logs.len(), 1);
    assert_eq!(detail.recent_logs[0].headers["host"], "localhost");
}

#[tokio::test]
async fn unknown_bin_is_not_found() {
    let stub = spawn_stub(backend);
    let err = stub.client().get_bin_detail("missing").await.unwrap_err();
    assert!(matches!(err, ConsoleError::Status { status: 404, .. }));
}

#[tokio::test]
async fn update_puts_status_and_body() {
    let stub = spawn_stub(backend);
    stub.client()
        .update_bin_response("b1", 201, &json!({"a": 1}))
        .await
        .unwrap();

    let seen = stub.seen();
    assert_eq!(seen[0].method, "PUT");
    assert_eq!(seen[0].url, "/api/bins/b1/response");
    let sent: Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(sent, json!({"status": 201, "body": {"a": 1}}));
}

#[tokio::test]
async fn create_extracts_id() {
    let stub = spawn_stub(backend);
    assert_eq!(stub.client().create_bin().await.unwrap().as_deref(), Some("b1"));
}

#[tokio::test]
async fn create_without_marker_is_none() {
    fn no_marker(_method: &str, _url: &str) -> (u16, String) {
        (200, "Created!\n".to_string())
    }
    let stub = spawn_stub(no_marker);
    assert_eq!(stub.client().create_bin().await.unwrap(), None);
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let base_url = format!("http://127.0.0.1:{}", port);
    let api = ApiClient::new(&base_url, Duration::from_secs(2)).unwrap();
    let err = api.list_bins().await.unwrap_err();
    assert!(matches!(err, ConsoleError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn reload_then_open_is_sequenced() {
    let stub = spawn_stub(backend);
    let (tx, rx) = mpsc::channel();

    console::execute(&stub.client(), Command::ReloadThenOpen("b1".into()), &tx).await;

    let events: Vec<ConsoleEvent> = rx.try_iter().collect();
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], ConsoleEvent::BinsLoaded(Ok(bins)) if bins.len() == 2));
    assert!(matches!(&events[1], ConsoleEvent::DetailLoaded(Ok(detail)) if detail.id == "b1"));

    let urls: Vec<String> = stub.seen().into_iter().map(|s| s.url).collect();
    assert_eq!(urls, ["/api/bins", "/api/bins/b1"]);
}

#[tokio::test]
async fn save_command_reports_its_payload() {
    let stub = spawn_stub(backend);
    let (tx, rx) = mpsc::channel();
    let command = Command::SaveResponse {
        id: "b1".into(),
        status: 201,
        body: json!({"a": 1}),
    };

    console::execute(&stub.client(), command, &tx).await;

    match rx.try_recv().unwrap() {
        ConsoleEvent::ResponseSaved {
            id,
            status,
            body,
            result,
        } => {
            assert_eq!(id, "b1");
            assert_eq!(status, 201);
            assert_eq!(body, json!({"a": 1}));
            assert!(result.is_ok());
        }
        other => panic!("unexpected event {other:?}"),
    }
}
