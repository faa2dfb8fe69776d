// SPDX-License-Identifier: GPL-3.0-only

//! HTTP classification tests against a canned local server

use foodcam::analysis::{AnalysisClient, AnalysisResult, FailureCategory, HttpAnalysisClient};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Read one full HTTP request (headers plus Content-Length body)
async fn read_request(socket: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return buf,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + content_length {
                return buf;
            }
        }
    }
}

/// Spawn a server answering exactly one request with a fixed response.
///
/// Returns the base URL and a handle resolving to the raw request bytes.
async fn serve_once(
    status_line: &'static str,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (format!("http://{}", addr), handle)
}

#[tokio::test]
async fn successful_detection_returns_output() {
    let (base, server) = serve_once("200 OK", r#"{"success":true,"output":"apple"}"#).await;
    let client = HttpAnalysisClient::new(base);

    let result = client.detect("aGVsbG8=".to_string()).await;
    assert_eq!(
        result,
        AnalysisResult::Success {
            text: "apple".to_string()
        }
    );

    // The request carries the bare base64 in the `image` field
    let request = server.await.unwrap();
    let text = String::from_utf8_lossy(&request);
    assert!(text.starts_with("POST /detect"));
    assert!(text.contains(r#""image":"aGVsbG8=""#));
}

#[tokio::test]
async fn declared_failure_is_a_server_error() {
    let (base, _server) =
        serve_once("200 OK", r#"{"success":false,"error":"no food detected"}"#).await;
    let client = HttpAnalysisClient::new(base);

    let result = client.detect("aGVsbG8=".to_string()).await;
    assert_eq!(
        result,
        AnalysisResult::Failure {
            message: "no food detected".to_string(),
            category: FailureCategory::ServerError,
        }
    );
}

#[tokio::test]
async fn declared_failure_without_message_gets_a_fallback() {
    let (base, _server) = serve_once("200 OK", r#"{"success":false}"#).await;
    let client = HttpAnalysisClient::new(base);

    let result = client.detect("aGVsbG8=".to_string()).await;
    assert_eq!(
        result,
        AnalysisResult::Failure {
            message: "Unknown error occurred".to_string(),
            category: FailureCategory::ServerError,
        }
    );
}

#[tokio::test]
async fn http_error_status_is_a_server_error() {
    let (base, _server) =
        serve_once("500 Internal Server Error", r#"{"error":"model crashed"}"#).await;
    let client = HttpAnalysisClient::new(base);

    let result = client.detect("aGVsbG8=".to_string()).await;
    assert_eq!(
        result,
        AnalysisResult::Failure {
            message: "model crashed".to_string(),
            category: FailureCategory::ServerError,
        }
    );
}

#[tokio::test]
async fn http_error_without_body_reports_the_status() {
    let (base, _server) = serve_once("503 Service Unavailable", "").await;
    let client = HttpAnalysisClient::new(base);

    let result = client.advice().await;
    let AnalysisResult::Failure { message, category } = result else {
        panic!("expected failure");
    };
    assert_eq!(category, FailureCategory::ServerError);
    assert!(message.contains("503"));
}

#[tokio::test]
async fn stalled_server_is_a_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // Accept and then sit on the connection without answering
    let _server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let _ = read_request(&mut socket).await;
        tokio::time::sleep(Duration::from_secs(60)).await;
    });

    let client = HttpAnalysisClient::with_timeouts(
        format!("http://{}", addr),
        Duration::from_millis(200),
        Duration::from_millis(200),
    );

    let result = client.detect("aGVsbG8=".to_string()).await;
    assert_eq!(
        result,
        AnalysisResult::Failure {
            message: "request timed out".to_string(),
            category: FailureCategory::NetworkTimeout,
        }
    );
}

#[tokio::test]
async fn unreachable_server_is_an_unknown_transport_failure() {
    // Bind then drop so the port is known-dead
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpAnalysisClient::new(format!("http://{}", addr));
    let result = client.advice().await;
    let AnalysisResult::Failure { category, .. } = result else {
        panic!("expected failure");
    };
    assert_eq!(category, FailureCategory::Unknown);
}
