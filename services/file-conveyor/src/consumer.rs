//! Consumer stage: resolve a file name to its size

use std::io::ErrorKind;
use std::path::Path;

use crate::types::{ConveyorError, FileSize};

/// Size in bytes of `dir/name`
///
/// The file is opened for reading first, so a file that exists but cannot
/// be opened is reported as [`ConveyorError::Unreadable`].
pub async fn file_size(dir: &Path, name: &str) -> Result<FileSize, ConveyorError> {
    let unreadable = |source: std::io::Error| match source.kind() {
        ErrorKind::NotFound => ConveyorError::NotFound(name.to_string()),
        _ => ConveyorError::Unreadable {
            name: name.to_string(),
            source,
        },
    };

    let file = tokio::fs::File::open(dir.join(name))
        .await
        .map_err(unreadable)?;
    let metadata = file.metadata().await.map_err(unreadable)?;

    Ok(FileSize {
        name: name.to_string(),
        bytes: metadata.len(),
    })
}
