//! Translation between archive-internal paths and host paths

use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Separator used inside PBO entry names and prefixes
pub const INTERNAL_SEPARATOR: char = '\\';

/// Replace every internal separator with the host separator.
///
/// Nothing else is touched: no case folding, no `..` resolution and no
/// filtering of characters the host rejects.
pub fn map_path(internal: &str) -> String {
    internal.replace(INTERNAL_SEPARATOR, &MAIN_SEPARATOR.to_string())
}

/// `base` joined with the mapped form of `internal`
pub fn join_mapped(base: &Path, internal: &str) -> PathBuf {
    base.join(map_path(internal))
}
