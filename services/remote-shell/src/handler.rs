//! Connection handling
//!
//! One handler invocation per accepted connection:
//!
//! 1. read a single request of at most `read_buffer_bytes`
//! 2. split off the body after the first `\r\n\r\n`
//! 3. check the body against the denylist
//! 4. answer 403, or run the command and answer 200 with its output
//!
//! Every failure ends the connection and nothing else. A request without
//! the delimiter, or a command that cannot be launched, gets no reply at
//! all: the stream is closed with zero bytes written.

use std::fmt;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{info, warn};

use crate::executor::{CommandRunner, ShellExecutor};
use crate::guard::CommandPolicy;
use crate::response::{write_forbidden, write_success};
use crate::types::{CommandDecision, Config, Request, ShellError, FORBIDDEN_BODY};

const DELIMITER: &[u8] = b"\r\n\r\n";

/// How a connection that got a reply ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Forbidden,
    Executed {
        exit_code: Option<i32>,
        truncated: bool,
    },
}

/// Shared, read-only state used by every connection
pub struct ConnectionHandler {
    policy: CommandPolicy,
    runner: Arc<dyn CommandRunner>,
    read_buffer_bytes: usize,
}

impl ConnectionHandler {
    /// Create a handler that runs commands through the configured shell
    pub fn new(config: &Config) -> Self {
        Self::with_runner(
            CommandPolicy::new(&config.policy),
            Arc::new(ShellExecutor::new(&config.policy, &config.limits)),
            config.server.read_buffer_bytes,
        )
    }

    pub fn with_runner(
        policy: CommandPolicy,
        runner: Arc<dyn CommandRunner>,
        read_buffer_bytes: usize,
    ) -> Self {
        Self {
            policy,
            runner,
            read_buffer_bytes,
        }
    }

    /// Serve one connection end to end
    ///
    /// The stream is consumed and closed before this returns, on every path.
    pub async fn handle<S>(&self, stream: S, peer: &str) -> Result<Outcome, ShellError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let mut session = Session::new(stream, peer);

        let raw = read_request(&mut session.stream, self.read_buffer_bytes).await?;
        let request = parse_request(&raw)?;

        info!(peer, command = %request.command, "Received command");

        match self.policy.decide(&request.command) {
            CommandDecision::Forbidden => {
                warn!(peer, command = %request.command, "Rejected forbidden command");
                write_forbidden(&mut session.stream, FORBIDDEN_BODY).await;
                Ok(Outcome::Forbidden)
            }
            CommandDecision::Allowed => {
                let result = self.runner.run(&request.command).await?;
                if result.truncated {
                    warn!(peer, "Command output exceeded buffer and was truncated");
                }
                let outcome = Outcome::Executed {
                    exit_code: result.exit_code,
                    truncated: result.truncated,
                };
                write_success(&mut session.stream, result.output).await;
                Ok(outcome)
            }
        }
    }
}

impl fmt::Debug for ConnectionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandler")
            .field("policy", &self.policy)
            .field("read_buffer_bytes", &self.read_buffer_bytes)
            .finish_non_exhaustive()
    }
}

/// Owns the connection for the lifetime of one handler call
///
/// Dropping it closes the stream, so the close happens exactly once
/// whichever way the handler exits.
struct Session<'a, S> {
    stream: S,
    peer: &'a str,
}

impl<'a, S> Session<'a, S> {
    fn new(stream: S, peer: &'a str) -> Self {
        Self { stream, peer }
    }
}

impl<S> Drop for Session<'_, S> {
    fn drop(&mut self) {
        info!(peer = self.peer, "Session closed");
    }
}

/// Read one request with a single read call
async fn read_request<R>(reader: &mut R, capacity: usize) -> Result<Vec<u8>, ShellError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; capacity];
    let n = reader.read(&mut buf).await?;
    if n == 0 {
        return Err(ShellError::ConnectionClosed);
    }
    buf.truncate(n);
    Ok(buf)
}

/// Extract the command: everything after the first blank line, trimmed
pub fn parse_request(raw: &[u8]) -> Result<Request, ShellError> {
    let start = raw
        .windows(DELIMITER.len())
        .position(|w| w == DELIMITER)
        .ok_or(ShellError::MalformedRequest)?
        + DELIMITER.len();

    let command = String::from_utf8_lossy(&raw[start..]).trim().to_string();
    Ok(Request { command })
}
