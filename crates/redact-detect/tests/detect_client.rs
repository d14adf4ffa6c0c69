//! Integration tests: detection client over real HTTP (redact-detect).
//!
//! A one-shot TCP listener plays the vision service, so the full
//! request → response → normalized boxes path runs without the network.

#![cfg(feature = "client")]

use pretty_assertions::assert_eq;
use redact_detect::{DetectConfig, DetectError, DetectionClient, Detector};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Serve exactly one HTTP response; the join handle yields the raw request.
async fn serve_once(status: u16, body: String) -> (String, JoinHandle<String>) {
    let reason = if status == 200 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    serve_raw(response).await
}

/// Write `response` verbatim after reading one request, then hang up.
async fn serve_raw(response: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (format!("http://{addr}/v1/chat/completions"), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn chat_body(content: &str) -> String {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
    .to_string()
}

fn client_for(endpoint: &str, key: Option<&str>) -> DetectionClient {
    let mut config = DetectConfig::default().with_endpoint(endpoint);
    config.api_key = key.map(str::to_string);
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    DetectionClient::with_http(config, http)
}

// ─── Success paths ──────────────────────────────────────────────────────

#[tokio::test]
async fn detect_returns_normalized_boxes() {
    init_logging();
    let content = r#"{"thought":"two amounts","boxes":[{"label":"balance","box_2d":[300,100,700,180]},{"box_2d":[650,450,500,400]}]}"#;
    let (endpoint, server) = serve_once(200, chat_body(content)).await;
    let client = client_for(&endpoint, Some("test-key"));

    let boxes = client
        .detect(b"\x89PNG fake", "image/png", "hide all amounts")
        .await
        .unwrap();

    assert_eq!(boxes.len(), 2);
    assert_eq!(
        (boxes[1].xmin(), boxes[1].ymin(), boxes[1].xmax(), boxes[1].ymax()),
        (500, 400, 650, 450)
    );
    assert_eq!(boxes[0].label(), Some("balance"));

    let request = server.await.unwrap();
    let lower = request.to_lowercase();
    assert!(lower.starts_with("post /v1/chat/completions"));
    assert!(lower.contains("authorization: bearer test-key"));
    assert!(request.contains("hide all amounts"));
    assert!(request.contains("data:image/png;base64,"));
    assert!(request.contains("\"stream\":false"));
}

#[tokio::test]
async fn empty_boxes_is_not_an_error() {
    init_logging();
    let (endpoint, server) = serve_once(200, chat_body(r#"{"boxes":[]}"#)).await;
    let boxes = client_for(&endpoint, Some("k"))
        .detect(b"img", "image/png", "hide faces")
        .await
        .unwrap();
    assert!(boxes.is_empty());
    server.await.unwrap();
}

// ─── Failure paths ──────────────────────────────────────────────────────

#[tokio::test]
async fn non_2xx_is_request_failed_with_status() {
    init_logging();
    let (endpoint, server) = serve_once(500, r#"{"error":"overloaded"}"#.to_string()).await;
    let err = client_for(&endpoint, Some("k"))
        .detect(b"img", "image/png", "hide faces")
        .await
        .unwrap_err();

    match err {
        DetectError::RequestFailed { status, message } => {
            assert_eq!(status, Some(500));
            assert!(message.contains("overloaded"));
        }
        other => panic!("expected RequestFailed, got {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn truncated_error_body_keeps_status() {
    init_logging();
    // Promises 100 bytes, sends 5, closes.
    let response =
        "HTTP/1.1 502 Bad Gateway\r\ncontent-length: 100\r\nconnection: close\r\n\r\nshort"
            .to_string();
    let (endpoint, server) = serve_raw(response).await;
    let err = client_for(&endpoint, Some("k"))
        .detect(b"img", "image/png", "hide faces")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert!(matches!(err, DetectError::RequestFailed { .. }));
    server.await.unwrap();
}

#[tokio::test]
async fn prose_reply_is_unparsable() {
    init_logging();
    let (endpoint, server) =
        serve_once(200, chat_body("Sorry, I can't help with that.")).await;
    let err = client_for(&endpoint, Some("k"))
        .detect(b"img", "image/png", "hide faces")
        .await
        .unwrap_err();
    assert!(matches!(err, DetectError::ResponseUnparsable { .. }));
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_service_is_request_failed_without_status() {
    init_logging();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(&format!("http://{addr}/v1/chat/completions"), Some("k"))
        .detect(b"img", "image/png", "hide faces")
        .await
        .unwrap_err();
    assert_eq!(err.status(), None);
    assert!(matches!(err, DetectError::RequestFailed { .. }));
}

#[tokio::test]
async fn missing_credential_sends_nothing() {
    init_logging();
    let err = client_for("http://127.0.0.1:9/unused", None)
        .detect(b"img", "image/png", "hide faces")
        .await
        .unwrap_err();
    assert!(matches!(err, DetectError::MissingCredential));
}
