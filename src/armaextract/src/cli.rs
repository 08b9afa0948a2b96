//! CLI argument definitions for armaextract

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::extract::ExtractionPolicy;
use crate::rules::{IgnoreRules, Toggles};

#[derive(Parser, Debug)]
#[command(name = "armaextract")]
#[command(about = "Extract Arma PBO archives, optionally skipping or minifying content")]
#[command(version)]
#[allow(clippy::struct_excessive_bools)]
pub struct Args {
    /// Source folder with PBOs
    pub source: PathBuf,

    /// Output folder
    pub output: PathBuf,

    /// PBO prefixes to ignore, separated by ';' (matches anywhere in the prefix)
    #[arg(long = "ignore-prefix", value_delimiter = ';')]
    pub ignore_prefixes: Vec<String>,

    /// Ignore Arma 3 dubbing files
    #[arg(long)]
    pub ignore_dubbing: bool,

    /// Ignore Arma 3 map layers files
    #[arg(long)]
    pub ignore_map_layers: bool,

    /// Ignore Arma 3 mission files
    #[arg(long)]
    pub ignore_missions: bool,

    /// Write empty files for large binary files
    #[arg(long)]
    pub minify: bool,

    /// Number of worker threads (default: one per core)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Config file (default: armaextract/config.toml in the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn toggles(&self) -> Toggles {
        Toggles {
            dubbing: self.ignore_dubbing,
            map_layers: self.ignore_map_layers,
            missions: self.ignore_missions,
        }
    }

    /// Policy for this run: command line patterns and toggles plus the
    /// config file's patterns
    pub fn policy(&self, config: &Config) -> ExtractionPolicy {
        let patterns = self
            .ignore_prefixes
            .iter()
            .chain(&config.ignore_prefixes)
            .cloned();
        ExtractionPolicy::new(IgnoreRules::build(patterns, self.toggles()), self.minify)
    }

    pub fn jobs(&self, config: &Config) -> Option<usize> {
        self.jobs.or(config.jobs)
    }
}
