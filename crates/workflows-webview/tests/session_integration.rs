//! End-to-end session tests over real HTTP.
//!
//! Each test starts a one-shot HTTP server on a loopback port, points a
//! [`WorkflowsWebview`] at it, and drives a [`HeadlessSurface`].  This
//! exercises the `reqwest` endpoint, the negotiation rules, URL composition
//! and the message bridge together.

use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_test::{assert_err, assert_ok};

use workflows_core::CHANNEL_NAME;
use workflows_webview::infrastructure::HeadlessSurface;
use workflows_webview::{ErrorKind, WorkflowsWebview};

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// Serves one canned HTTP response and returns the raw request it received.
async fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();

        String::from_utf8_lossy(&request).into_owned()
    });

    (base_url, handle)
}

fn token_body(status: &str) -> String {
    json!({
        "result": {
            "workflow": {"status": status},
            "public_url": "https://view.example.com/session/xyz"
        }
    })
    .to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_pristine_workflow_loads_over_http() {
    // Arrange
    let (base_url, server) = serve_once("200 OK", token_body("pristine")).await;
    let webview = WorkflowsWebview::with_base_url("key1", &base_url).unwrap();
    let surface = Arc::new(HeadlessSurface::new());

    // Act
    let session = assert_ok!(webview.start("abc-123", surface.clone(), true).await);
    let request = server.await.unwrap();

    // Assert: one authenticated GET on the token endpoint
    assert!(
        request.starts_with("GET /workflows/abc-123/create-token HTTP/1.1\r\n"),
        "{request}"
    );
    assert!(request.to_ascii_lowercase().contains("rem-apikey: key1\r\n"), "{request}");

    // Assert: the composed URL was loaded
    assert_eq!(
        session.load_url().as_str(),
        "https://view.example.com/session/xyz?minimal=true"
    );
    assert_eq!(surface.loaded_urls(), vec![session.load_url().clone()]);
}

#[tokio::test]
async fn test_used_workflow_is_not_loaded() {
    let (base_url, server) = serve_once("200 OK", token_body("used")).await;
    let webview = WorkflowsWebview::with_base_url("key1", &base_url).unwrap();
    let surface = Arc::new(HeadlessSurface::new());

    let error = assert_err!(webview.start("abc-123", surface.clone(), false).await);
    server.await.unwrap();

    assert_eq!(error.kind(), ErrorKind::WorkflowNotUsable);
    assert!(surface.loaded_urls().is_empty());
}

#[tokio::test]
async fn test_server_error_is_negotiation_failure() {
    let (base_url, server) =
        serve_once("500 Internal Server Error", "{\"error\":\"boom\"}".to_string()).await;
    let webview = WorkflowsWebview::with_base_url("key1", &base_url).unwrap();
    let surface = Arc::new(HeadlessSurface::new());

    let error = assert_err!(webview.start("abc-123", surface.clone(), false).await);
    server.await.unwrap();

    assert_eq!(error.kind(), ErrorKind::NegotiationFailed);
    assert!(surface.loaded_urls().is_empty());
}

#[tokio::test]
async fn test_closed_port_is_negotiation_failure() {
    // Arrange: bind then drop, so nothing listens on the port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let webview = WorkflowsWebview::with_base_url("key1", &base_url).unwrap();

    // Act
    let error = assert_err!(
        webview
            .start("abc-123", Arc::new(HeadlessSurface::new()), false)
            .await
    );

    // Assert
    assert_eq!(error.kind(), ErrorKind::NegotiationFailed);
}

#[tokio::test]
async fn test_messages_reach_callbacks_after_start() {
    // Arrange
    let (base_url, server) = serve_once("200 OK", token_body("pristine")).await;
    let webview = WorkflowsWebview::with_base_url("key1", &base_url).unwrap();
    let steps = Arc::new(Mutex::new(Vec::new()));
    let workflows = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&steps);
    webview.on_step(move |step| s.lock().unwrap().push((step.id, step.done)));
    let w = Arc::clone(&workflows);
    webview.on_workflow(move |wf| w.lock().unwrap().push(wf.id));
    let surface = Arc::new(HeadlessSurface::new());

    let session = assert_ok!(webview.start("abc-123", surface.clone(), false).await);
    server.await.unwrap();

    // Act
    surface.post_message(CHANNEL_NAME, json!({"entity": "step", "value": {"id": "s1", "done": true}}));
    surface.post_message(CHANNEL_NAME, json!({"entity": "workflow", "value": {"id": "wf-1"}}));
    surface.post_message(CHANNEL_NAME, json!({"entity": "step", "value": "garbage"}));

    // Assert
    assert_eq!(*steps.lock().unwrap(), vec![("s1".to_string(), true)]);
    assert_eq!(*workflows.lock().unwrap(), vec!["wf-1".to_string()]);
    session.detach();
}

#[tokio::test]
async fn test_completion_callback_receives_outcome() {
    // Arrange
    let (base_url, server) = serve_once("200 OK", token_body("pristine")).await;
    let webview = WorkflowsWebview::with_base_url("key1", &base_url).unwrap();
    let surface = Arc::new(HeadlessSurface::new());
    let (tx, rx) = tokio::sync::oneshot::channel();

    // Act
    let handle = webview.start_with_completion("abc-123", surface.clone(), true, move |result| {
        let _ = tx.send(result.map(|session| session.load_url().clone()));
    });
    handle.await.unwrap();
    server.await.unwrap();

    // Assert
    let url = assert_ok!(rx.await.unwrap());
    assert_eq!(url.as_str(), "https://view.example.com/session/xyz?minimal=true");
    assert!(surface.post_message(CHANNEL_NAME, json!({"entity": "step", "value": {}})));
}

#[tokio::test]
async fn test_messages_arrive_after_completion_drops_session() {
    // Arrange: a completion that only reports success and drops the session
    let (base_url, server) = serve_once("200 OK", token_body("pristine")).await;
    let webview = WorkflowsWebview::with_base_url("key1", &base_url).unwrap();
    let steps = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&steps);
    webview.on_step(move |step| s.lock().unwrap().push(step.id));
    let surface = Arc::new(HeadlessSurface::new());
    let (tx, rx) = tokio::sync::oneshot::channel();

    // Act
    let handle = webview.start_with_completion("abc-123", surface.clone(), true, move |result| {
        let _ = tx.send(result.is_ok());
    });
    handle.await.unwrap();
    server.await.unwrap();
    let delivered = surface.post_message(CHANNEL_NAME, json!({"entity": "step", "value": {"id": "s1"}}));

    // Assert
    assert!(rx.await.unwrap());
    assert!(delivered);
    assert_eq!(*steps.lock().unwrap(), vec!["s1".to_string()]);
}
