//! Test harness: an in-process server on 127.0.0.1:0

use std::net::SocketAddr;

use remote_shell::{Config, Listener};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        let mut config = Config::default();
        config.server.bind_address = "127.0.0.1".to_string();
        config.server.port = 0;

        let listener = Listener::bind(&config).expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(listener.run_until(async {
            let _ = rx.await;
        }));

        Self {
            addr,
            shutdown: Some(tx),
            task: Some(task),
        }
    }

    /// Send raw bytes and read until the server closes the connection
    pub async fn send_raw(&self, request: &[u8]) -> Vec<u8> {
        let mut stream = TcpStream::connect(self.addr)
            .await
            .expect("Failed to connect to test server");
        stream.write_all(request).await.expect("Failed to send");

        let mut response = Vec::new();
        stream
            .read_to_end(&mut response)
            .await
            .expect("Failed to read response");
        response
    }

    /// Send a command wrapped in a minimal request
    pub async fn send_command(&self, command: &str) -> ParsedResponse {
        let request = format!("POST / HTTP/1.1\r\nHost: test\r\n\r\n{}", command);
        ParsedResponse::parse(&self.send_raw(request.as_bytes()).await)
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.await.expect("Server task panicked");
        }
    }
}

#[derive(Debug)]
pub struct ParsedResponse {
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ParsedResponse {
    pub fn parse(raw: &[u8]) -> Self {
        let split = raw
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("Response has no header terminator");
        let head = std::str::from_utf8(&raw[..split]).expect("Headers are not UTF-8");
        let mut lines = head.split("\r\n");
        let status_line = lines.next().unwrap_or_default().to_string();
        let headers = lines
            .filter_map(|l| l.split_once(": "))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self {
            status_line,
            headers,
            body: raw[split + 4..].to_vec(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}
