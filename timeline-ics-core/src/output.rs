//! Atomic output writes.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{TimelineError, TimelineResult};

/// Write `content` to `path` via a temporary file in the same directory
/// and a rename, so `path` is either the old file or the complete new one.
pub fn write_atomically(path: &Path, content: &str) -> TimelineResult<()> {
    let output_error = |source: std::io::Error| TimelineError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(dir).map_err(output_error)?;

    let mut file = NamedTempFile::new_in(dir).map_err(output_error)?;
    file.write_all(content.as_bytes()).map_err(output_error)?;
    file.as_file().sync_all().map_err(output_error)?;
    file.persist(path).map_err(|e| output_error(e.error))?;

    Ok(())
}
