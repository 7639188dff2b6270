//! Listener / dispatcher
//!
//! Owns the bound socket and accepts forever. Each connection runs in its
//! own tokio task; finished tasks are reaped from a [`JoinSet`] in the same
//! `select!` as the accept, so neither a slow command nor a pile of
//! completed handlers can stall new connections.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpSocket};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::handler::{ConnectionHandler, Outcome};
use crate::types::{Config, ShellError};

/// Pause after a non-transient accept error (e.g. out of file descriptors)
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub struct Listener {
    listener: TcpListener,
    handler: Arc<ConnectionHandler>,
}

impl Listener {
    /// Bind the address and port from config
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(config: &Config) -> Result<Self, ShellError> {
        let addr = config.server.socket_addr()?;
        Self::bind_with(addr, config.server.backlog, ConnectionHandler::new(config))
    }

    /// Bind with address reuse enabled and a bounded backlog
    pub fn bind_with(
        addr: SocketAddr,
        backlog: u32,
        handler: ConnectionHandler,
    ) -> Result<Self, ShellError> {
        let bind_err = |source| ShellError::Bind { addr, source };

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(bind_err)?;

        socket.set_reuseaddr(true).map_err(bind_err)?;
        socket.bind(addr).map_err(bind_err)?;
        let listener = socket.listen(backlog).map_err(bind_err)?;

        Ok(Self {
            listener,
            handler: Arc::new(handler),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the process is killed
    pub async fn run(self) {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves
    ///
    /// In-flight handlers are awaited before returning.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        if let Ok(addr) = self.local_addr() {
            info!("Remote shell server is running on {}", addr);
        }

        let mut tasks = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting connections");
                    break;
                }

                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        info!(%peer, "Got connection");
                        let handler = Arc::clone(&self.handler);
                        tasks.spawn(async move {
                            let peer = peer.to_string();
                            let result = handler.handle(stream, &peer).await;
                            log_outcome(&peer, &result);
                        });
                    }
                    Err(e) if is_transient(&e) => {
                        debug!("Transient accept error, retrying: {}", e);
                    }
                    Err(e) => {
                        error!("Accept error: {}", e);
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    reap(joined);
                }
            }
        }

        if !tasks.is_empty() {
            info!("Waiting for {} active connection(s)", tasks.len());
        }
        while let Some(joined) = tasks.join_next().await {
            reap(joined);
        }

        info!("Remote shell server stopped");
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}

fn reap(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            error!("Connection handler panicked: {}", e);
        } else {
            debug!("Connection handler cancelled: {}", e);
        }
    }
}

fn log_outcome(peer: &str, result: &Result<Outcome, ShellError>) {
    match result {
        Ok(Outcome::Forbidden) => debug!(peer, "Answered 403"),
        Ok(Outcome::Executed {
            exit_code,
            truncated,
        }) => debug!(peer, ?exit_code, truncated, "Answered 200"),
        Err(ShellError::ConnectionClosed) => {
            debug!(peer, "Peer closed the connection before sending a request")
        }
        Err(ShellError::MalformedRequest) => {
            warn!(peer, "Malformed request (no body found), closing without reply")
        }
        Err(e @ (ShellError::Launch(_) | ShellError::Wait(_))) => error!(peer, "{}", e),
        Err(e) => warn!(peer, "Connection failed: {}", e),
    }
}
