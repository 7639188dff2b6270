//! Type definitions for the file conveyor

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the conveyor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory whose regular files are measured
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Pause between names sent by the producer, in milliseconds
    #[serde(default)]
    pub send_interval_ms: u64,

    /// Names buffered between producer and consumer
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_channel_capacity() -> usize {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            send_interval_ms: 0,
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Size of one file, as reported by the consumer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSize {
    pub name: String,
    pub bytes: u64,
}

/// Result of a full pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub files: Vec<FileSize>,
    /// Names the consumer could not measure
    pub failed: Vec<String>,
}

impl Report {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.bytes).sum()
    }
}

#[derive(Error, Debug)]
pub enum ConveyorError {
    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File unreadable: {name}: {source}")]
    Unreadable {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Pipeline stage failed: {0}")]
    Stage(String),
}
