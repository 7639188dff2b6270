//! Shell Common - Shared utilities for the remote shell services
//!
//! This crate provides the ambient plumbing every binary in the workspace needs:
//!
//! - **Initialization**: [`init_tracing`] for standardized stderr logging
//! - **Configuration**: [`load_config`] for TOML config discovery
//!
//! # Example
//!
//! ```rust,ignore
//! use shell_common::{init_tracing, load_config};
//!
//! init_tracing("remote_shell")?;
//! let config: Config = load_config("REMOTE_SHELL_CONFIG", "remote-shell");
//! ```

pub mod config;
pub mod init;

pub use config::{candidate_paths, load_config, load_config_from};
pub use init::{init_tracing, LogFormat};
