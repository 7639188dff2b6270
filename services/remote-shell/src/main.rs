//! Remote Shell - executes commands sent over TCP, guarded by a denylist

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use remote_shell::{Config, Listener};

#[derive(Parser, Debug)]
#[command(name = "remote-shell", version, about)]
struct Args {
    /// Path to a TOML config file (skips the standard search locations)
    #[arg(short, long, env = "REMOTE_SHELL_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "REMOTE_SHELL_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(short, long, env = "REMOTE_SHELL_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shell_common::init_tracing("remote_shell")?;

    let args = Args::parse();

    let mut config: Config = match &args.config {
        Some(path) => shell_common::load_config_from(path)?,
        None => shell_common::load_config("REMOTE_SHELL_CONFIG", "remote-shell"),
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }

    tracing::info!(
        denylist = ?config.policy.denylist,
        shell = %config.policy.shell,
        "Starting remote shell server"
    );

    let listener = Listener::bind(&config).context("Failed to start listener")?;

    listener
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}
