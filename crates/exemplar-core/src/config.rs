//! Harness configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per expectation plus a summary line.
    #[default]
    Text,
    /// Pretty-printed JSON document.
    Json,
}

/// Complete harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Directory searched for fixture files when no paths are given
    pub fixtures_dir: PathBuf,
    /// Report format
    pub format: OutputFormat,
    /// Maximum number of fixture files evaluated concurrently
    pub jobs: usize,
    /// Log filter used when `RUST_LOG` is not set
    pub log_filter: String,
    /// Convert producer panics into fixture errors
    pub catch_panics: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            fixtures_dir: PathBuf::from("tests/fixtures"),
            format: OutputFormat::Text,
            jobs: 4,
            log_filter: "info".to_owned(),
            catch_panics: true,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    ///
    /// # Errors
    /// Returns an error if `jobs` is zero or the log filter is empty.
    pub fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            return Err(Error::Config("jobs must be at least 1".to_owned()));
        }
        if self.log_filter.trim().is_empty() {
            return Err(Error::Config("log_filter must not be empty".to_owned()));
        }
        Ok(())
    }
}
