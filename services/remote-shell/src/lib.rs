//! Remote Shell Library
//!
//! A single-port server that reads one HTTP-shaped request per connection,
//! treats the body as a shell command, refuses it if any denylist entry
//! appears in it, and otherwise runs it and replies with the merged
//! stdout/stderr.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use remote_shell::{Config, Listener};
//!
//! let listener = Listener::bind(&Config::default())?;
//! listener.run_until(async { tokio::signal::ctrl_c().await.ok(); }).await;
//! ```

pub mod executor;
pub mod guard;
pub mod handler;
pub mod listener;
pub mod response;
pub mod types;

pub use executor::{CommandRunner, ShellExecutor};
pub use guard::CommandPolicy;
pub use handler::{ConnectionHandler, Outcome};
pub use listener::Listener;
pub use response::{Response, Status};
pub use types::{Config, ShellError};
