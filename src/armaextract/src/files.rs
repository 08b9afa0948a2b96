//! File writes used by extraction

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Write `bytes` to `path` through a temporary file in the same directory,
/// so the final name only ever holds complete content. Parent directories
/// are created as needed and an existing file is replaced.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory {:?}", parent))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".armaextract-")
        .tempfile_in(parent)
        .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
    tmp.write_all(bytes)
        .with_context(|| format!("Failed to write {:?}", path))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .with_context(|| format!("Failed to set permissions on {:?}", path))?;
    }

    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

/// Create (or truncate) a zero-byte file at `path`
pub fn write_placeholder(path: &Path) -> Result<()> {
    write_atomic(path, &[])
}
