//! Finding archives under a source directory

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// Extension of archive files, compared case-insensitively
pub const ARCHIVE_EXTENSION: &str = "pbo";

/// One archive waiting to be processed
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArchiveTask {
    pub path: PathBuf,
}

/// Recursively collect every `.pbo` file under `root`, sorted by path so runs
/// are reproducible.
///
/// Unreadable subdirectories are logged and skipped; an unreadable root is an
/// error.
pub fn discover(root: &Path) -> Result<Vec<ArchiveTask>> {
    if !root.is_dir() {
        bail!("Source folder does not exist: {:?}", root);
    }

    let mut tasks = Vec::new();

    for entry in walkdir::WalkDir::new(root).into_iter() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => bail!("Failed to read {:?}: {}", root, e),
            Err(e) => {
                tracing::warn!("skipping unreadable path: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let is_archive = entry
            .path()
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
            .unwrap_or(false);

        if is_archive {
            tasks.push(ArchiveTask {
                path: entry.into_path(),
            });
        }
    }

    tasks.sort();
    tracing::debug!("found {} archives under {:?}", tasks.len(), root);
    Ok(tasks)
}
