//! Runs many fixture files concurrently, each in isolation.

use std::panic::resume_unwind;
use std::path::{Path, PathBuf};

use exemplar_core::{GateError, OutcomeRecord, Summary};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::loader::LoadedFixture;

/// Suite execution options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteOptions {
    /// Maximum number of fixture files evaluated at the same time
    pub jobs: usize,
    /// Convert producer panics into fixture errors
    pub catch_panics: bool,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            jobs: 4,
            catch_panics: true,
        }
    }
}

/// What happened to one fixture file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// The file loaded and every example was evaluated.
    Evaluated {
        /// One record per example, in declaration order.
        outcomes: Vec<OutcomeRecord>,
    },
    /// The file could not be loaded; none of its examples ran.
    LoadFailed {
        /// Load error message.
        error: String,
    },
}

/// Report for one fixture file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// Fixture path.
    pub path: PathBuf,
    /// Fixture name, when the file loaded.
    pub name: Option<String>,
    /// Counts for this file.
    pub summary: Summary,
    /// Evaluation result.
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

impl FileReport {
    /// Load and evaluate one fixture file.
    pub fn run(path: &Path, catch_panics: bool) -> Self {
        let mut fixture = match LoadedFixture::load(path) {
            Ok(fixture) => fixture.with_panic_capture(catch_panics),
            Err(error) => {
                warn!(path = %path.display(), %error, "fixture failed to load");
                return Self::load_failed(path.to_path_buf(), error.to_string());
            }
        };

        let report = fixture.run();
        info!(
            fixture = fixture.name(),
            passed = report.summary.passed,
            failed = report.summary.failed,
            fixture_errors = report.summary.fixture_errors,
            "evaluated fixture"
        );
        Self {
            path: path.to_path_buf(),
            name: Some(fixture.name().to_owned()),
            summary: report.summary,
            outcome: FileOutcome::Evaluated {
                outcomes: report.records(fixture.space()),
            },
        }
    }

    /// Report for a file that never got evaluated.
    pub fn load_failed(path: PathBuf, error: impl Into<String>) -> Self {
        Self {
            path,
            name: None,
            summary: Summary {
                load_errors: 1,
                ..Summary::default()
            },
            outcome: FileOutcome::LoadFailed {
                error: error.into(),
            },
        }
    }

    /// Whether the file loaded and every example passed.
    pub const fn passed(&self) -> bool {
        self.summary.all_passed()
    }

    /// Plain-text section for this file.
    pub fn render_text(&self) -> String {
        let mut text = match &self.name {
            Some(name) => format!("== {} ({name})\n", self.path.display()),
            None => format!("== {}\n", self.path.display()),
        };
        match &self.outcome {
            FileOutcome::Evaluated { outcomes } => {
                for record in outcomes {
                    text.push_str(&record.line());
                    text.push('\n');
                }
                text.push_str(&self.summary.line());
                text.push('\n');
            }
            FileOutcome::LoadFailed { error } => {
                text.push_str("LOAD  ");
                text.push_str(error);
                text.push('\n');
            }
        }
        text
    }
}

/// Reports for every fixture file plus overall counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Per-file reports, in path order.
    pub files: Vec<FileReport>,
    /// Counts across all files.
    pub summary: Summary,
}

impl SuiteReport {
    /// Aggregate per-file reports.
    pub fn from_files(files: Vec<FileReport>) -> Self {
        let mut summary = Summary::default();
        for file in &files {
            summary.merge(&file.summary);
        }
        Self { files, summary }
    }

    /// Whether every file loaded and every example passed.
    pub const fn passed(&self) -> bool {
        self.summary.all_passed()
    }

    /// Plain-text report: every file section, then the overall summary.
    pub fn render_text(&self) -> String {
        let mut text = String::new();
        for file in &self.files {
            text.push_str(&file.render_text());
            text.push('\n');
        }
        text.push_str("total: ");
        text.push_str(&self.summary.line());
        text.push('\n');
        text
    }

    /// Pretty-printed JSON report.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn render_json(&self) -> exemplar_core::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Turn the overall summary into a pass/fail gate.
    ///
    /// # Errors
    /// Returns an error if any example failed or errored, or any file did
    /// not load.
    pub const fn enforce_gate(&self) -> Result<(), GateError> {
        self.summary.enforce_gate()
    }
}

/// Load and evaluate fixture files on blocking tasks, at most
/// `options.jobs` at a time.
///
/// Files share nothing; a load error affects only its own file. The report
/// lists files in the order given. A `jobs` of zero is treated as one.
///
/// # Panics
/// Re-raises a panic from a fixture task. With `catch_panics` set, producer
/// panics are already reported as fixture errors and never reach this point.
pub async fn run_suite(paths: Vec<PathBuf>, options: SuiteOptions) -> SuiteReport {
    let jobs = options.jobs.max(1);
    info!(files = paths.len(), jobs, "running fixture suite");

    let catch_panics = options.catch_panics;
    let slots = run_bounded(&paths, jobs, move |path| FileReport::run(path, catch_panics)).await;
    let files = slots
        .into_iter()
        .zip(paths)
        .map(|(slot, path)| {
            slot.unwrap_or_else(|| FileReport::load_failed(path, "evaluation task was cancelled"))
        })
        .collect();
    let report = SuiteReport::from_files(files);
    info!(summary = %report.summary.line(), "fixture suite finished");
    report
}

/// Run `work` over every path on blocking tasks, never more than `jobs` at
/// once. Results keep the order of `paths`; a cancelled task leaves `None`.
async fn run_bounded<T, F>(paths: &[PathBuf], jobs: usize, work: F) -> Vec<Option<T>>
where
    T: Send + 'static,
    F: Fn(&Path) -> T + Clone + Send + 'static,
{
    let jobs = jobs.max(1);
    let mut slots: Vec<Option<T>> = paths.iter().map(|_| None).collect();
    let mut pending = paths.iter().cloned().enumerate();
    let mut tasks = JoinSet::new();

    loop {
        while tasks.len() < jobs {
            let Some((index, path)) = pending.next() else {
                break;
            };
            let task = work.clone();
            tasks.spawn_blocking(move || (index, task(&path)));
        }
        let Some(joined) = tasks.join_next().await else {
            break;
        };
        match joined {
            Ok((index, result)) => {
                if let Some(slot) = slots.get_mut(index) {
                    *slot = Some(result);
                }
            }
            Err(error) if error.is_panic() => {
                warn!(%error, "fixture task panicked");
                resume_unwind(error.into_panic());
            }
            Err(error) => warn!(%error, "fixture task did not complete"),
        }
    }
    slots
}
