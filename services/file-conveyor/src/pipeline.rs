//! The two-stage pipeline
//!
//! A blocking producer walks the directory and pushes names through a
//! bounded channel; an async consumer measures each one. The run ends when
//! the producer has sent every name and the consumer has drained the
//! channel.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::consumer::file_size;
use crate::producer::list_regular_files;
use crate::types::{Config, ConveyorError, Report};

pub async fn run_pipeline(config: &Config) -> Result<Report, ConveyorError> {
    let dir = config.directory.clone();
    // Opened here so a bad directory fails the run instead of the task
    let names = list_regular_files(&dir)?;

    let (tx, mut rx) = mpsc::channel::<String>(config.channel_capacity.max(1));
    let interval = Duration::from_millis(config.send_interval_ms);

    let producer = tokio::task::spawn_blocking(move || {
        let mut sent = 0usize;
        for name in names {
            if tx.blocking_send(name.clone()).is_err() {
                warn!("Consumer stopped early, producer giving up");
                break;
            }
            info!(%name, "Sent");
            sent += 1;
            if !interval.is_zero() {
                std::thread::sleep(interval);
            }
        }
        sent
    });

    let consumer = tokio::spawn(async move {
        let mut report = Report::default();
        while let Some(name) = rx.recv().await {
            info!(%name, "Received");
            match file_size(&dir, &name).await {
                Ok(size) => {
                    info!(name = %size.name, bytes = size.bytes, "File size");
                    report.files.push(size);
                }
                Err(e) => {
                    warn!("{}", e);
                    report.failed.push(name);
                }
            }
        }
        report
    });

    let sent = producer
        .await
        .map_err(|e| ConveyorError::Stage(format!("producer: {}", e)))?;
    let report = consumer
        .await
        .map_err(|e| ConveyorError::Stage(format!("consumer: {}", e)))?;

    debug!(sent, measured = report.files.len(), "Pipeline finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileSize;
    use std::fs;

    #[tokio::test]
    async fn test_pipeline_measures_every_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one"), b"1").unwrap();
        fs::write(dir.path().join("three"), b"333").unwrap();
        fs::write(dir.path().join("empty"), b"").unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();

        let config = Config {
            directory: dir.path().to_path_buf(),
            ..Config::default()
        };
        let mut report = run_pipeline(&config).await.unwrap();
        report.files.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(
            report.files,
            vec![
                FileSize {
                    name: "empty".to_string(),
                    bytes: 0
                },
                FileSize {
                    name: "one".to_string(),
                    bytes: 1
                },
                FileSize {
                    name: "three".to_string(),
                    bytes: 3
                },
            ]
        );
        assert!(report.failed.is_empty());
        assert_eq!(report.total_bytes(), 4);
    }

    #[tokio::test]
    async fn test_pipeline_with_pacing_and_wide_channel() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..3 {
            fs::write(dir.path().join(format!("f{}", i)), vec![b'x'; i]).unwrap();
        }

        let config = Config {
            directory: dir.path().to_path_buf(),
            send_interval_ms: 5,
            channel_capacity: 8,
        };
        let report = run_pipeline(&config).await.unwrap();
        assert_eq!(report.files.len(), 3);
        assert_eq!(report.total_bytes(), 3);
    }

    #[tokio::test]
    async fn test_pipeline_missing_directory() {
        let config = Config {
            directory: "/nonexistent/conveyor".into(),
            ..Config::default()
        };
        assert!(matches!(
            run_pipeline(&config).await,
            Err(ConveyorError::ReadDir { .. })
        ));
    }
}
