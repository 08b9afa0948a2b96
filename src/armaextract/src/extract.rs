//! Per-archive extraction
//!
//! Every archive ends in exactly one [`Outcome`]. Archives are split into
//! groups whose output trees cannot overlap. Groups run in parallel on a
//! bounded thread pool while the archives of one group run one after another
//! in discovery order, so a path written by several archives always ends up
//! with the content of the last one, as in a sequential run.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::classify::classify;
use crate::container::{Container, Opener};
use crate::discovery::ArchiveTask;
use crate::files::write_placeholder;
use crate::paths::{join_mapped, map_path, INTERNAL_SEPARATOR};
use crate::report::Reporter;
use crate::rules::IgnoreRules;

/// How archives are filtered and written. Built once per run.
#[derive(Debug, Clone, Default)]
pub struct ExtractionPolicy {
    pub rules: IgnoreRules,
    /// Replace placeholder-suffix entries with empty files under the prefix
    /// directory instead of extracting them
    pub minify: bool,
}

impl ExtractionPolicy {
    pub fn new(rules: IgnoreRules, minify: bool) -> Self {
        Self { rules, minify }
    }
}

/// Final state of one archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Declared prefix matched an ignore rule
    Excluded,
    /// No declared prefix, or an empty one
    PrefixMissing,
    Extracted { files: usize, placeholders: usize },
    Failed(String),
    /// The run was cancelled before this archive started
    Cancelled,
}

/// Outcomes of a run, in discovery order
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<(PathBuf, Outcome)>,
}

impl RunSummary {
    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }

    pub fn extracted(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Extracted { .. }))
    }

    /// Excluded, prefix-less and cancelled archives
    pub fn skipped(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                Outcome::Excluded | Outcome::PrefixMissing | Outcome::Cancelled
            )
        })
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    pub fn outcome(&self, path: &Path) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, o)| o)
    }
}

/// Runs a batch of [`ArchiveTask`]s against one output directory
pub struct Extractor<'a, O: Opener> {
    opener: O,
    policy: &'a ExtractionPolicy,
    output: PathBuf,
    reporter: &'a dyn Reporter,
    jobs: Option<usize>,
    cancel: Arc<AtomicBool>,
}

impl<'a, O: Opener> Extractor<'a, O> {
    pub fn new(
        opener: O,
        policy: &'a ExtractionPolicy,
        output: impl Into<PathBuf>,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            opener,
            policy,
            output: output.into(),
            reporter,
            jobs: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Worker thread count; `None` or `Some(0)` uses one per core
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Share a cancellation flag. Archives that have not started when it is
    /// set finish as [`Outcome::Cancelled`]; running archives complete.
    pub fn cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn run(&self, tasks: &[ArchiveTask]) -> Result<RunSummary> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.unwrap_or(0))
            .build()
            .context("Failed to start worker threads")?;

        let mut outcomes: Vec<Option<Outcome>> = vec![None; tasks.len()];
        for (index, outcome) in pool.install(|| self.run_all(tasks)) {
            outcomes[index] = Some(outcome);
        }

        let outcomes = tasks
            .iter()
            .zip(outcomes)
            .map(|(task, outcome)| (task.path.clone(), outcome.unwrap_or(Outcome::Cancelled)))
            .collect();

        Ok(RunSummary { outcomes })
    }

    fn run_all(&self, tasks: &[ArchiveTask]) -> Vec<(usize, Outcome)> {
        let groups = self.schedule(tasks);
        tracing::debug!("{} archive groups for {} archives", groups.len(), tasks.len());

        let results: Vec<Vec<(usize, Outcome)>> = groups
            .into_par_iter()
            .map(|group| {
                group
                    .into_iter()
                    .map(|index| (index, self.process(&tasks[index])))
                    .collect()
            })
            .collect();

        results.into_iter().flatten().collect()
    }

    /// Task indices split into groups whose output trees cannot overlap.
    ///
    /// Full mode writes every archive into the output root, so everything is
    /// one group. Minified mode writes under `output/prefix`; archives whose
    /// prefixes are equal or nested share a group. Each group is in discovery
    /// order.
    fn schedule(&self, tasks: &[ArchiveTask]) -> Vec<Vec<usize>> {
        if !self.policy.minify {
            return vec![(0..tasks.len()).collect()];
        }

        let keys: Vec<Option<Vec<String>>> = tasks
            .par_iter()
            .map(|task| self.subtree_of(&task.path))
            .collect();
        group_by_subtree(&keys)
    }

    /// Output subtree key of an archive. Archives that fail to open, have no
    /// prefix or are excluded write nothing and get `None`. The header is dropped again;
    /// the archive is reopened when its group reaches it.
    fn subtree_of(&self, path: &Path) -> Option<Vec<String>> {
        let container = self.opener.open(path).ok()?;
        let prefix = container.prefix()?;
        if self.policy.rules.should_exclude(Some(prefix)) {
            return None;
        }
        let key = subtree_key(prefix);
        (!key.is_empty()).then_some(key)
    }

    /// Resolve the prefix gate: the declared prefix to extract under, or the
    /// terminal outcome of a skipped archive
    fn gate(&self, container: &O::Container) -> std::result::Result<String, Outcome> {
        let prefix = match container.prefix() {
            Some(prefix) if !prefix.is_empty() => prefix,
            _ => {
                self.reporter.missing_prefix(container.file_name());
                return Err(Outcome::PrefixMissing);
            }
        };

        if let Some(rule) = self.policy.rules.matching(prefix) {
            self.reporter
                .excluded(container.file_name(), prefix, rule.as_str());
            return Err(Outcome::Excluded);
        }

        Ok(prefix.to_string())
    }

    /// Open, gate and extract one archive. The opened archive lives only for
    /// the duration of this call.
    fn process(&self, task: &ArchiveTask) -> Outcome {
        if self.cancel.load(Ordering::Relaxed) {
            return self.finish(task, Outcome::Cancelled);
        }

        let container = match self.opener.open(&task.path) {
            Ok(container) => container,
            Err(e) => {
                self.reporter.failed(&task.path, &e);
                return self.finish(task, Outcome::Failed(format!("{:#}", e)));
            }
        };

        let prefix = match self.gate(&container) {
            Ok(prefix) => prefix,
            Err(outcome) => return self.finish(task, outcome),
        };

        self.reporter.extracting(container.file_name());

        let result = if self.policy.minify {
            self.extract_minified(&prefix, &container)
        } else {
            self.extract_full(&container)
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.reporter.failed(&task.path, &e);
                Outcome::Failed(format!("{:#}", e))
            }
        };
        self.finish(task, outcome)
    }

    /// Every entry at its own internal path directly under the output root.
    /// Unlike minified mode, output is not nested under the prefix directory.
    fn extract_full(&self, container: &O::Container) -> Result<Outcome> {
        let entries: Vec<_> = container.entries().iter().collect();
        let files = container.extract(&entries, &self.output)?;
        Ok(Outcome::Extracted {
            files,
            placeholders: 0,
        })
    }

    /// Content entries into `output/prefix`, placeholders as empty files
    /// beside them
    fn extract_minified(&self, prefix: &str, container: &O::Container) -> Result<Outcome> {
        let dest = self.output.join(map_path(prefix));
        let classified = classify(container.entries());

        let files = container.extract(&classified.full_content, &dest)?;

        for entry in &classified.placeholder {
            write_placeholder(&join_mapped(&dest, &entry.path))?;
        }

        Ok(Outcome::Extracted {
            files,
            placeholders: classified.placeholder.len(),
        })
    }

    fn finish(&self, task: &ArchiveTask, outcome: Outcome) -> Outcome {
        self.reporter.finished(&task.path, &outcome);
        outcome
    }
}

/// Lowercased, non-empty components of a prefix. Host separators are
/// split too, and case is folded since the output may land on a
/// case-insensitive filesystem.
fn subtree_key(prefix: &str) -> Vec<String> {
    prefix
        .split([INTERNAL_SEPARATOR, '/'])
        .filter(|c| !c.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

/// Group indices so that keys where one is a component prefix of the other
/// land together. `None` keys get a group of their own. Groups are in
/// ascending index order.
fn group_by_subtree(keys: &[Option<Vec<String>>]) -> Vec<Vec<usize>> {
    let mut groups = Vec::new();
    let mut keyed: Vec<(&[String], usize)> = Vec::new();

    for (index, key) in keys.iter().enumerate() {
        match key {
            Some(key) => keyed.push((key.as_slice(), index)),
            None => groups.push(vec![index]),
        }
    }

    // After sorting, everything nested under a key follows it directly
    keyed.sort();

    let mut root: &[String] = &[];
    let mut current: Vec<usize> = Vec::new();
    for (key, index) in keyed {
        if current.is_empty() || !key.starts_with(root) {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
            root = key;
        }
        current.push(index);
    }
    if !current.is_empty() {
        groups.push(current);
    }

    for group in &mut groups {
        group.sort_unstable();
    }
    groups
}
