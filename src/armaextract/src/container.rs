//! Seam between the extraction policy and the archive format
//!
//! The orchestrator only needs a declared prefix, an entry list and a way to
//! write a set of entries into a directory. [`PboOpener`] provides those for
//! PBO files via the `pbo` crate.

use anyhow::{Context, Result};
use std::path::Path;

use crate::files::write_atomic;
use crate::paths::join_mapped;

/// One named unit of content inside an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Internal path, `\`-separated
    pub path: String,
    /// Content length in bytes
    pub size: u64,
    /// Position of the entry in its archive, used to fetch its content
    pub index: usize,
}

/// An opened archive
pub trait Container: Send {
    /// File name used in diagnostics
    fn file_name(&self) -> &str;

    /// Declared internal path prefix
    fn prefix(&self) -> Option<&str>;

    fn entries(&self) -> &[Entry];

    /// Write `entries` under `dest`, each at its mapped internal path.
    /// Returns the number of files written.
    fn extract(&self, entries: &[&Entry], dest: &Path) -> Result<usize>;
}

/// Opens archives found by discovery
pub trait Opener: Sync {
    type Container: Container;

    fn open(&self, path: &Path) -> Result<Self::Container>;
}

/// [`Opener`] for PBO files
#[derive(Debug, Default, Clone, Copy)]
pub struct PboOpener;

impl Opener for PboOpener {
    type Container = PboContainer;

    fn open(&self, path: &Path) -> Result<PboContainer> {
        PboContainer::open(path)
    }
}

/// A PBO viewed through [`Container`]
#[derive(Debug)]
pub struct PboContainer {
    pbo: pbo::Pbo,
    file_name: String,
    entries: Vec<Entry>,
}

impl PboContainer {
    pub fn open(path: &Path) -> Result<Self> {
        let pbo = pbo::Pbo::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        tracing::debug!(
            archive = ?path,
            entries = pbo.entries().len(),
            properties = ?pbo.properties(),
            "opened PBO"
        );
        let entries = pbo
            .entries()
            .iter()
            .enumerate()
            .map(|(index, e)| Entry {
                path: e.name.clone(),
                size: e.size(),
                index,
            })
            .collect();

        Ok(Self {
            file_name: pbo.file_name(),
            pbo,
            entries,
        })
    }
}

impl Container for PboContainer {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn prefix(&self) -> Option<&str> {
        self.pbo.prefix()
    }

    fn entries(&self) -> &[Entry] {
        &self.entries
    }

    fn extract(&self, entries: &[&Entry], dest: &Path) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let mut data = self
            .pbo
            .data()
            .with_context(|| format!("Failed to reopen {:?}", self.pbo.path()))?;

        for entry in entries {
            let raw = self
                .pbo
                .entries()
                .get(entry.index)
                .with_context(|| format!("No entry #{} in {}", entry.index, self.file_name))?;
            let bytes = data
                .read(raw)
                .with_context(|| format!("Failed to read '{}' from {}", raw.name, self.file_name))?;

            let out_path = join_mapped(dest, &entry.path);
            tracing::trace!(entry = %entry.path, path = ?out_path, "writing entry");
            write_atomic(&out_path, &bytes)?;
        }

        Ok(entries.len())
    }
}
