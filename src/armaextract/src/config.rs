//! Configuration file for armaextract

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Defaults applied to every run, merged with the command line
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Ignore patterns added to those given with `--ignore-prefix`
    pub ignore_prefixes: Vec<String>,
    /// Worker threads when `--jobs` is not given
    pub jobs: Option<usize>,
}

impl Config {
    /// Get the path to the default config file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("armaextract").join("config.toml"))
    }

    /// Load `explicit` if given (it must exist), otherwise the default config
    /// file if there is one
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Config::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}
