//! Case configuration file.
//!
//! One YAML file describes one sync case: where the local snapshot lives,
//! which foreground database is assembled from which template, where the
//! remote SQLite file is and under which schema namespace, and which passes
//! a plain `invsync sync` runs. Relative paths are resolved against the
//! config file's directory, so a case directory can be moved as a whole.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a case file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The case file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Path of the case file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The case file is not a valid case document.
    #[error("cannot parse config {path}: {source}")]
    Format {
        /// Path of the case file.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_yaml::Error,
    },
}

/// Local store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
    /// Path of the JSON snapshot the local store round-trips through.
    pub snapshot: PathBuf,
}

/// Foreground database settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ForegroundConfig {
    /// Logical name of the foreground database.
    pub name: String,
    /// Path of the YAML import template.
    pub template: PathBuf,
}

/// Remote store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Path of the SQLite database file.
    pub path: PathBuf,
    /// Schema namespace prefixing every relation.
    pub schema: String,
}

/// Which passes `invsync sync` runs when no override flag is given.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PassConfig {
    /// Run the push pass.
    pub push: bool,
    /// Run the pull pass.
    pub pull: bool,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self { push: true, pull: true }
    }
}

/// A complete sync case.
#[derive(Debug, Clone, Deserialize)]
pub struct CaseConfig {
    /// Local store settings.
    pub local: LocalConfig,
    /// Foreground database settings.
    pub foreground: ForegroundConfig,
    /// Remote store settings.
    pub remote: RemoteConfig,
    /// Default passes; optional, both enabled when absent.
    #[serde(default)]
    pub sync: PassConfig,
}

impl CaseConfig {
    /// Loads a case file and resolves its relative paths against the file's
    /// directory.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Format {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(base) = path.parent() {
            config.local.snapshot = rebase(base, config.local.snapshot);
            config.foreground.template = rebase(base, config.foreground.template);
            config.remote.path = rebase(base, config.remote.path);
        }
        Ok(config)
    }
}

fn rebase(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
