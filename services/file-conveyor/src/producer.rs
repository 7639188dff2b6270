//! Producer stage: names of regular files in a directory

use std::fs;
use std::path::Path;

use crate::types::ConveyorError;

/// Lazily list the regular files directly inside `dir`
///
/// Directories, symlinks and other special files are skipped, as are
/// entries whose names are not valid UTF-8. Errors on individual entries
/// are logged and skipped; only failing to open the directory is an error.
pub fn list_regular_files(dir: &Path) -> Result<impl Iterator<Item = String>, ConveyorError> {
    let entries = fs::read_dir(dir).map_err(|source| ConveyorError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    Ok(entries.filter_map(|entry| {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable directory entry: {}", e);
                return None;
            }
        };

        // DirEntry::file_type does not follow symlinks
        match entry.file_type() {
            Ok(ft) if ft.is_file() => {}
            Ok(_) => return None,
            Err(e) => {
                tracing::warn!("Cannot stat {:?}: {}", entry.file_name(), e);
                return None;
            }
        }

        match entry.file_name().into_string() {
            Ok(name) => Some(name),
            Err(raw) => {
                tracing::warn!("Skipping non UTF-8 file name {:?}", raw);
                None
            }
        }
    }))
}
