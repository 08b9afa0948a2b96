//! Diagnostics for a run
//!
//! The orchestrator reports through [`Reporter`] instead of printing, so the
//! binary can route messages around its progress bar and tests can inspect
//! what was reported.

use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::extract::Outcome;

pub trait Reporter: Sync {
    /// Extraction of an archive is starting
    fn extracting(&self, file_name: &str);

    /// An archive declares no prefix and is skipped
    fn missing_prefix(&self, file_name: &str);

    /// An archive matched an ignore rule and is skipped
    fn excluded(&self, file_name: &str, prefix: &str, rule: &str) {
        tracing::trace!(archive = file_name, prefix, rule, "excluded by ignore rule");
    }

    /// An archive could not be opened or extracted
    fn failed(&self, path: &Path, error: &anyhow::Error);

    /// An archive reached its final state
    fn finished(&self, _path: &Path, _outcome: &Outcome) {}
}

/// Prints diagnostics to the terminal and advances a progress bar per archive
pub struct ConsoleReporter {
    progress: ProgressBar,
}

impl ConsoleReporter {
    pub fn new(progress: ProgressBar) -> Self {
        Self { progress }
    }
}

impl Reporter for ConsoleReporter {
    fn extracting(&self, file_name: &str) {
        self.progress.suspend(|| println!("Extracting {}", file_name));
    }

    fn missing_prefix(&self, file_name: &str) {
        self.progress.suspend(|| println!("{} has no prefix", file_name));
    }

    fn failed(&self, path: &Path, error: &anyhow::Error) {
        self.progress
            .suspend(|| eprintln!("Error {}: {:#}", path.display(), error));
    }

    fn finished(&self, _path: &Path, _outcome: &Outcome) {
        self.progress.inc(1);
    }
}

/// Something a [`MemoryReporter`] saw
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Extracting(String),
    MissingPrefix(String),
    Excluded { file_name: String, rule: String },
    Failed { path: PathBuf, message: String },
}

/// Records events in arrival order
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<Event>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.lock().clone()
    }

    fn push(&self, event: Event) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Event>> {
        // Events are only appended, so a poisoned lock still holds a usable Vec
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Reporter for MemoryReporter {
    fn extracting(&self, file_name: &str) {
        self.push(Event::Extracting(file_name.to_string()));
    }

    fn missing_prefix(&self, file_name: &str) {
        self.push(Event::MissingPrefix(file_name.to_string()));
    }

    fn excluded(&self, file_name: &str, _prefix: &str, rule: &str) {
        self.push(Event::Excluded {
            file_name: file_name.to_string(),
            rule: rule.to_string(),
        });
    }

    fn failed(&self, path: &Path, error: &anyhow::Error) {
        self.push(Event::Failed {
            path: path.to_path_buf(),
            message: format!("{:#}", error),
        });
    }
}
