//! Logging setup for the service binaries
//!
//! Both binaries log to stderr. Verbosity comes from `RUST_LOG`, with the
//! calling crate raised to `info` so its own notices show by default.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format of the stderr log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Plain lines, no colour codes
    Text,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// `LOG_FORMAT=json` (any case) selects JSON; anything else is text
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Install the global subscriber for `crate_name` (e.g. `"remote_shell"`)
///
/// Fails if the `RUST_LOG` directive cannot be built or a subscriber is
/// already installed.
pub fn init_tracing(crate_name: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(format!("{crate_name}=info").parse()?);
    let format = LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?,
    }

    Ok(())
}
