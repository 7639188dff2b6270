//! Type definitions for the remote shell server

use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Configuration Types
// ============================================================================

/// Configuration for the remote shell server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the listening socket to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// TCP port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Pending connections queued by the OS before accept
    #[serde(default = "default_backlog")]
    pub backlog: u32,

    /// Bytes read from a connection for a single request
    #[serde(default = "default_read_buffer")]
    pub read_buffer_bytes: usize,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_backlog() -> u32 {
    5
}

fn default_read_buffer() -> usize {
    4096
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            backlog: default_backlog(),
            read_buffer_bytes: default_read_buffer(),
        }
    }
}

impl ServerConfig {
    /// Resolve the configured bind address and port
    pub fn socket_addr(&self) -> Result<SocketAddr, ShellError> {
        let ip: IpAddr = self.bind_address.parse().map_err(|e| {
            ShellError::Config(format!(
                "Invalid bind address '{}': {}",
                self.bind_address, e
            ))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Substrings that forbid a command wherever they appear
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,

    /// Shell used to interpret commands
    #[serde(default = "default_shell")]
    pub shell: String,
}

fn default_denylist() -> Vec<String> {
    ["rm", "rmdir", "shutdown", "reboot", "mv", "touch", "cp"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_shell() -> String {
    "/bin/sh".to_string()
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            denylist: default_denylist(),
            shell: default_shell(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Captured output kept per command; the rest is drained and dropped
    #[serde(default = "default_output_buffer")]
    pub output_buffer_bytes: usize,
}

fn default_output_buffer() -> usize {
    8192
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            output_buffer_bytes: default_output_buffer(),
        }
    }
}

// ============================================================================
// Domain Types
// ============================================================================

/// Outcome of checking a command against the denylist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandDecision {
    Allowed,
    Forbidden,
}

/// Body sent when an allowed command prints nothing
pub const NO_OUTPUT_SENTINEL: &str = "Command executed but no output.\n";

/// Body sent for a denied command
pub const FORBIDDEN_BODY: &str = "Forbidden command.";

/// Captured output of a command that was launched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Merged stdout/stderr, never empty
    pub output: Vec<u8>,
    pub exit_code: Option<i32>,
    /// Output exceeded the buffer and was cut
    pub truncated: bool,
}

impl ExecutionResult {
    /// Build a result, replacing empty output with the sentinel text
    pub fn new(output: Vec<u8>, exit_code: Option<i32>, truncated: bool) -> Self {
        let output = if output.is_empty() {
            NO_OUTPUT_SENTINEL.as_bytes().to_vec()
        } else {
            output
        };
        Self {
            output,
            exit_code,
            truncated,
        }
    }
}

/// A parsed request: everything after the header delimiter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: String,
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Peer closed the connection before sending a request")]
    ConnectionClosed,

    #[error("Malformed request: no header/body delimiter found")]
    MalformedRequest,

    #[error("Failed to launch command: {0}")]
    Launch(#[source] std::io::Error),

    #[error("Failed waiting for command to exit: {0}")]
    Wait(#[source] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}
