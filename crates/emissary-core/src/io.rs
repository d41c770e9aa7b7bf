use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Atomically write `data` to `path` via a tempfile in the same directory.
/// Readers observe either the old content or the new, never a partial file.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
