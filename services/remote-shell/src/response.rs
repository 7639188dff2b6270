//! Wire responses
//!
//! Every connection gets at most one response, always shaped like a
//! minimal HTTP/1.1 reply with `Connection: close`.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Forbidden,
    ServerError,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Status::Success => 200,
            Status::Forbidden => 403,
            Status::ServerError => 500,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Status::Success => "OK",
            Status::Forbidden => "Forbidden",
            Status::ServerError => "Internal Server Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub body: Vec<u8>,
}

impl Response {
    pub fn success(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: Status::Success,
            body: body.into(),
        }
    }

    pub fn forbidden(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: Status::Forbidden,
            body: body.into(),
        }
    }

    /// Header block followed by the body bytes, untouched
    pub fn encode(&self) -> Vec<u8> {
        let header = format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: text/plain\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\
             \r\n",
            self.status.code(),
            self.status.reason(),
            self.body.len()
        );

        let mut bytes = Vec::with_capacity(header.len() + self.body.len());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// Write a response and shut down the write half
///
/// Failures are logged and not retried. The shutdown is attempted even when
/// the write failed; the caller still owns the stream and closes it on drop.
pub async fn write_response<W>(writer: &mut W, response: &Response)
where
    W: AsyncWrite + Unpin,
{
    if let Err(e) = writer.write_all(&response.encode()).await {
        warn!(status = response.status.code(), "Failed to send response: {}", e);
    } else if let Err(e) = writer.flush().await {
        warn!("Failed to flush response: {}", e);
    }

    if let Err(e) = writer.shutdown().await {
        warn!("Failed to shut down connection: {}", e);
    }
}

pub async fn write_success<W>(writer: &mut W, body: impl Into<Vec<u8>>)
where
    W: AsyncWrite + Unpin,
{
    write_response(writer, &Response::success(body)).await
}

pub async fn write_forbidden<W>(writer: &mut W, body: impl Into<Vec<u8>>)
where
    W: AsyncWrite + Unpin,
{
    write_response(writer, &Response::forbidden(body)).await
}
