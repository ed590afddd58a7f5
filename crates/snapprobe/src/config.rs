//! Run-wide configuration consumed by snapshot sessions and artifact writers.

use crate::result::ProbeResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default directory (relative to the working directory) holding reference images
pub const DEFAULT_REFERENCE_DIR: &str = "snap_references";

/// Default directory for failure and kept-output artifacts
pub const DEFAULT_ARTIFACT_DIR: &str = "target/snapprobe";

/// Environment variable forcing references to be rewritten
pub const ENV_REFRESH_REFERENCES: &str = "SNAPPROBE_REFRESH_REFERENCES";
/// Environment variable keeping output captures of successful runs
pub const ENV_KEEP_OUTPUT: &str = "SNAPPROBE_KEEP_OUTPUT";
/// Environment variable overriding the reference directory
pub const ENV_REFERENCE_DIR: &str = "SNAPPROBE_REFERENCE_DIR";
/// Environment variable overriding the artifact directory
pub const ENV_ARTIFACT_DIR: &str = "SNAPPROBE_ARTIFACT_DIR";

/// Configuration for snapshot comparison runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Overwrite existing references with the current capture
    pub refresh_references: bool,
    /// Persist output artifacts even when the comparison passes
    pub keep_output: bool,
    /// Directory holding reference images
    pub reference_dir: PathBuf,
    /// Directory receiving artifacts
    pub artifact_dir: PathBuf,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            refresh_references: false,
            keep_output: false,
            reference_dir: PathBuf::from(DEFAULT_REFERENCE_DIR),
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
        }
    }
}

impl ProbeConfig {
    /// Create a new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `SNAPPROBE_*` environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Load a JSON configuration file; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Apply overrides from a variable lookup
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup(ENV_REFRESH_REFERENCES) {
            self.refresh_references = is_truthy(&value);
        }
        if let Some(value) = lookup(ENV_KEEP_OUTPUT) {
            self.keep_output = is_truthy(&value);
        }
        if let Some(dir) = lookup(ENV_REFERENCE_DIR).filter(|d| !d.is_empty()) {
            self.reference_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_ARTIFACT_DIR).filter(|d| !d.is_empty()) {
            self.artifact_dir = PathBuf::from(dir);
        }
        self
    }

    /// Set reference refresh mode
    #[must_use]
    pub const fn with_refresh_references(mut self, refresh: bool) -> Self {
        self.refresh_references = refresh;
        self
    }

    /// Set keep-output mode
    #[must_use]
    pub const fn with_keep_output(mut self, keep: bool) -> Self {
        self.keep_output = keep;
        self
    }

    /// Set the reference directory
    #[must_use]
    pub fn with_reference_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reference_dir = dir.into();
        self
    }

    /// Set the artifact directory
    #[must_use]
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
