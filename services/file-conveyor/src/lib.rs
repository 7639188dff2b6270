//! File Conveyor Library
//!
//! Lists the regular files of one directory and reports their sizes
//! through a producer/consumer pipeline.
//!
//! - [`list_regular_files`] - producer of file names
//! - [`file_size`] - consumer lookup of a single name
//! - [`run_pipeline`] - both stages joined by a bounded channel

pub mod consumer;
pub mod pipeline;
pub mod producer;
pub mod types;

pub use consumer::file_size;
pub use pipeline::run_pipeline;
pub use producer::list_regular_files;
pub use types::{Config, ConveyorError, FileSize, Report};
