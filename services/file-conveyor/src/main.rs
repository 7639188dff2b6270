//! File Conveyor - report the sizes of the regular files in a directory

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use file_conveyor::{run_pipeline, Config};

#[derive(Parser, Debug)]
#[command(name = "file-conveyor", version, about)]
struct Args {
    /// Path to a TOML config file (skips the standard search locations)
    #[arg(short, long, env = "FILE_CONVEYOR_CONFIG")]
    config: Option<PathBuf>,

    /// Directory to scan
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Pause between names sent by the producer
    #[arg(short, long)]
    interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shell_common::init_tracing("file_conveyor")?;

    let args = Args::parse();

    let mut config: Config = match &args.config {
        Some(path) => shell_common::load_config_from(path)?,
        None => shell_common::load_config("FILE_CONVEYOR_CONFIG", "file-conveyor"),
    };
    if let Some(dir) = args.dir {
        config.directory = dir;
    }
    if let Some(interval_ms) = args.interval_ms {
        config.send_interval_ms = interval_ms;
    }

    // Installing the handler replaces the default SIGINT action, so an
    // interrupt no longer stops the run halfway.
    let interrupts = tokio::spawn(async {
        while tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt ignored, waiting for the pipeline to finish");
        }
    });

    let report = run_pipeline(&config)
        .await
        .with_context(|| format!("Conveyor failed on {}", config.directory.display()))?;

    interrupts.abort();

    tracing::info!(
        files = report.files.len(),
        failed = report.failed.len(),
        total_bytes = report.total_bytes(),
        "Conveyor finished"
    );
    Ok(())
}
