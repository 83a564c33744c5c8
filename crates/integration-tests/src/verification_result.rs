//! Verification result types.

use exemplar_fixtures::{FileOutcome, FileReport, SuiteReport};

/// Verification result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    /// Whether all verifications passed
    pub passed: bool,
    /// List of failures
    pub failures: Vec<String>,
    /// List of successes
    pub successes: Vec<String>,
}

impl VerificationResult {
    /// Create new verification result
    #[must_use]
    pub const fn new() -> Self {
        Self {
            passed: true,
            failures: Vec::new(),
            successes: Vec::new(),
        }
    }

    /// Add success
    pub fn add_success(&mut self, message: String) {
        self.successes.push(message);
    }

    /// Add failure
    pub fn add_failure(&mut self, message: String) {
        self.passed = false;
        self.failures.push(message);
    }

    /// Merge another result
    pub fn merge(&mut self, other: Self) {
        if !other.passed {
            self.passed = false;
        }
        self.failures.extend(other.failures);
        self.successes.extend(other.successes);
    }

    /// One entry per example of a file, or a single failure if the file did
    /// not load.
    #[must_use]
    pub fn from_file(report: &FileReport) -> Self {
        let mut result = Self::new();
        let origin = report.path.display();
        match &report.outcome {
            FileOutcome::Evaluated { outcomes } => {
                for record in outcomes {
                    let message = format!("{origin}: {}", record.line());
                    if record.passed() {
                        result.add_success(message);
                    } else {
                        result.add_failure(message);
                    }
                }
            }
            FileOutcome::LoadFailed { error } => {
                result.add_failure(format!("{origin}: {error}"));
            }
        }
        result
    }

    /// Merge the results of every file in a suite.
    #[must_use]
    pub fn from_suite(report: &SuiteReport) -> Self {
        let mut result = Self::new();
        for file in &report.files {
            result.merge(Self::from_file(file));
        }
        result
    }
}

impl Default for VerificationResult {
    fn default() -> Self {
        Self::new()
    }
}
