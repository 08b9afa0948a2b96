//! armaextract library - batch extraction of Arma PBO archives
//!
//! Archives are found under a source folder, gated on their declared prefix
//! against a set of ignore rules, and written to an output folder either in
//! full or minified (large visual assets replaced by empty files).

pub mod classify;
pub mod cli;
pub mod config;
pub mod container;
pub mod discovery;
pub mod extract;
mod files;
pub mod paths;
pub mod report;
pub mod rules;

#[cfg(test)]
mod testing;

pub use container::{Container, Entry, Opener, PboContainer, PboOpener};
pub use discovery::{discover, ArchiveTask};
pub use extract::{ExtractionPolicy, Extractor, Outcome, RunSummary};
pub use report::{ConsoleReporter, MemoryReporter, Reporter};
pub use rules::{IgnoreRule, IgnoreRules, Toggles};
