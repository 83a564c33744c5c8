use serde::{Deserialize, Serialize};

use crate::error::FixtureError;
use crate::value::{Comparison, Value};

/// Status of a single evaluated expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Actual value matched the expected value.
    Pass,
    /// Actual value differed from the expected value.
    Fail,
    /// The expectation could not be evaluated.
    FixtureError(FixtureError),
}

impl Status {
    /// Status without the fixture error payload.
    pub const fn kind(&self) -> StatusKind {
        match self {
            Self::Pass => StatusKind::Pass,
            Self::Fail => StatusKind::Fail,
            Self::FixtureError(_) => StatusKind::FixtureError,
        }
    }
}

/// Serializable status of a reported expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Passed.
    Pass,
    /// Failed its comparison.
    Fail,
    /// Could not be evaluated.
    FixtureError,
}

impl StatusKind {
    /// Name used in JSON reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::FixtureError => "fixture_error",
        }
    }

    /// Short label for text reports.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::FixtureError => "ERROR",
        }
    }
}

/// Result of evaluating one registered expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Registration index.
    pub index: usize,
    /// Description the expectation was registered with.
    pub description: String,
    /// Pass, fail or fixture error.
    pub status: Status,
    /// Comparison applied, absent when no actual value was produced.
    pub comparison: Option<Comparison>,
    /// Expected value.
    pub expected: Value,
    /// Actual value, absent on fixture errors.
    pub actual: Option<Value>,
}

impl Outcome {
    /// Whether the expectation passed.
    pub fn passed(&self) -> bool {
        matches!(self.status, Status::Pass)
    }

    /// Whether the expectation failed its comparison.
    pub fn failed(&self) -> bool {
        matches!(self.status, Status::Fail)
    }

    /// The fixture error, if evaluation did not produce a value.
    pub const fn fixture_error(&self) -> Option<&FixtureError> {
        match &self.status {
            Status::FixtureError(error) => Some(error),
            Status::Pass | Status::Fail => None,
        }
    }

    /// Short label for reports.
    pub const fn label(&self) -> &'static str {
        self.status.kind().label()
    }
}
