//! E2E test: the request/response contract over a real socket

use crate::harness::TestServer;

#[tokio::test]
async fn test_echo_returns_output() {
    let server = TestServer::start().await;

    let raw = server
        .send_raw(b"GET / \r\nHeader: x\r\n\r\necho hello")
        .await;
    let response = crate::harness::ParsedResponse::parse(&raw);

    assert_eq!(response.status_line, "HTTP/1.1 200 OK");
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
    assert_eq!(response.header("Connection"), Some("close"));
    assert_eq!(response.header("Content-Length"), Some("6"));
    assert_eq!(response.body, b"hello\n");

    server.stop().await;
}

#[tokio::test]
async fn test_forbidden_command_is_rejected() {
    let server = TestServer::start().await;
    let marker = std::env::temp_dir().join(format!("remote-shell-e2e-{}", std::process::id()));
    let marker = marker.display().to_string();

    // Would create the marker if it ever reached a shell
    let response = server
        .send_command(&format!("touch {}; rm -rf /tmp/x", marker))
        .await;

    assert_eq!(response.status_line, "HTTP/1.1 403 Forbidden");
    assert_eq!(response.body, b"Forbidden command.");
    assert_eq!(response.header("Content-Length"), Some("18"));
    assert!(!std::path::Path::new(&marker).exists());

    server.stop().await;
}

#[tokio::test]
async fn test_substring_match_rejects_innocent_text() {
    let server = TestServer::start().await;

    let response = server.send_command("echo touchdown").await;
    assert_eq!(response.status_line, "HTTP/1.1 403 Forbidden");

    server.stop().await;
}

#[tokio::test]
async fn test_silent_command_gets_sentinel() {
    let server = TestServer::start().await;

    let response = server.send_command("true").await;

    assert_eq!(response.status_line, "HTTP/1.1 200 OK");
    assert_eq!(response.body_text(), "Command executed but no output.\n");
    assert_eq!(response.header("Content-Length"), Some("32"));

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_request_gets_nothing() {
    let server = TestServer::start().await;

    let raw = server.send_raw(b"not-http-at-all").await;
    assert!(raw.is_empty());

    // The listener is unaffected
    let response = server.send_command("echo still-up").await;
    assert_eq!(response.body, b"still-up\n");

    server.stop().await;
}

#[tokio::test]
async fn test_stderr_and_exit_status_are_reported_as_output() {
    let server = TestServer::start().await;

    let response = server
        .send_command("echo out; echo err >&2; exit 4")
        .await;

    assert_eq!(response.status_line, "HTTP/1.1 200 OK");
    assert_eq!(response.body, b"out\nerr\n");

    server.stop().await;
}

#[tokio::test]
async fn test_body_is_verbatim_and_length_exact() {
    let server = TestServer::start().await;

    let response = server.send_command("printf 'h\\303\\251llo\\r\\n\\tX'").await;

    let expected = "héllo\r\n\tX".as_bytes();
    assert_eq!(response.body, expected);
    assert_eq!(
        response.header("Content-Length"),
        Some(expected.len().to_string().as_str())
    );

    server.stop().await;
}

#[tokio::test]
async fn test_pipes_are_interpreted_by_shell() {
    let server = TestServer::start().await;

    let response = server.send_command("printf 'b\\na\\n' | sort").await;
    assert_eq!(response.body, b"a\nb\n");

    server.stop().await;
}
