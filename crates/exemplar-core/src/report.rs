//! Summaries, the pass/fail gate, and report rendering.

use core::fmt::Write as _;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::outcome::{Outcome, Status, StatusKind};
use crate::reflect::Reflect;
use crate::value::Comparison;

/// Aggregate counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Expectations evaluated.
    pub total: usize,
    /// Expectations that passed.
    pub passed: usize,
    /// Expectations whose comparison failed.
    pub failed: usize,
    /// Expectations that could not be evaluated.
    pub fixture_errors: usize,
    /// Fixture files that could not be loaded.
    pub load_errors: usize,
}

impl Summary {
    /// Count outcomes.
    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            summary.record(outcome);
        }
        summary
    }

    /// Count one outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        self.total += 1;
        match outcome.status {
            Status::Pass => self.passed += 1,
            Status::Fail => self.failed += 1,
            Status::FixtureError(_) => self.fixture_errors += 1,
        }
    }

    /// Add another summary's counts to this one.
    pub fn merge(&mut self, other: &Self) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.fixture_errors += other.fixture_errors;
        self.load_errors += other.load_errors;
    }

    /// Whether every expectation passed and every fixture loaded.
    pub const fn all_passed(&self) -> bool {
        self.failed == 0 && self.fixture_errors == 0 && self.load_errors == 0
    }

    /// Turn the summary into a pass/fail gate.
    ///
    /// # Errors
    /// Returns an error if anything failed, errored or did not load.
    pub const fn enforce_gate(&self) -> Result<(), GateError> {
        if self.all_passed() {
            Ok(())
        } else {
            Err(GateError {
                failed: self.failed,
                fixture_errors: self.fixture_errors,
                load_errors: self.load_errors,
            })
        }
    }

    /// One-line human summary.
    pub fn line(&self) -> String {
        let mut line = format!(
            "{} passed, {} failed, {} fixture errors ({} total)",
            self.passed, self.failed, self.fixture_errors, self.total
        );
        if self.load_errors > 0 {
            let _ignored = write!(line, ", {} fixture files failed to load", self.load_errors);
        }
        line
    }
}

/// Returned by [`Summary::enforce_gate`] when a run is not clean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expectation gate failed: failed={failed}, fixture_errors={fixture_errors}, load_errors={load_errors}")]
pub struct GateError {
    /// Assertion mismatches.
    pub failed: usize,
    /// Fixture errors.
    pub fixture_errors: usize,
    /// Fixture files that did not load.
    pub load_errors: usize,
}

/// Serializable rendering of an outcome, with values inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// Registration index.
    pub index: usize,
    /// Description.
    pub description: String,
    /// Pass, fail or fixture error.
    pub status: StatusKind,
    /// Comparison applied, if a value was produced.
    pub comparison: Option<Comparison>,
    /// Inspected expected value.
    pub expected: String,
    /// Inspected actual value.
    pub actual: Option<String>,
    /// Fixture error message.
    pub error: Option<String>,
}

impl OutcomeRecord {
    /// Render an outcome using a reflective capability for object reprs.
    pub fn from_outcome(outcome: &Outcome, reflect: &dyn Reflect) -> Self {
        Self {
            index: outcome.index,
            description: outcome.description.clone(),
            status: outcome.status.kind(),
            comparison: outcome.comparison,
            expected: reflect.inspect(&outcome.expected),
            actual: outcome.actual.as_ref().map(|actual| reflect.inspect(actual)),
            error: outcome.fixture_error().map(ToString::to_string),
        }
    }

    /// Whether this record is a pass.
    pub fn passed(&self) -> bool {
        self.status == StatusKind::Pass
    }

    /// Report line: label, description, expected and actual or error.
    pub fn line(&self) -> String {
        let label = self.status.label();
        let description = if self.description.trim().is_empty() {
            "<missing description>"
        } else {
            self.description.as_str()
        };
        match (&self.actual, &self.error) {
            (Some(actual), _) => format!(
                "{label:<5} {description}  expected={} actual={actual}",
                self.expected
            ),
            (None, Some(error)) => format!(
                "{label:<5} {description}  expected={} error={error}",
                self.expected
            ),
            (None, None) => format!("{label:<5} {description}  expected={}", self.expected),
        }
    }
}

/// Outcomes of one registry evaluation plus their summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// One outcome per registered expectation, in registration order.
    pub outcomes: Vec<Outcome>,
    /// Aggregate counts.
    pub summary: Summary,
}

impl RunReport {
    /// Inspect every outcome into a serializable record.
    pub fn records(&self, reflect: &dyn Reflect) -> Vec<OutcomeRecord> {
        self.outcomes
            .iter()
            .map(|outcome| OutcomeRecord::from_outcome(outcome, reflect))
            .collect()
    }

    /// Plain-text report: one line per expectation, then the summary.
    pub fn render_text(&self, reflect: &dyn Reflect) -> String {
        let mut text = String::new();
        for record in self.records(reflect) {
            text.push_str(&record.line());
            text.push('\n');
        }
        text.push_str(&self.summary.line());
        text.push('\n');
        text
    }

    /// JSON report with records and summary.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn render_json(&self, reflect: &dyn Reflect) -> crate::Result<String> {
        let document = serde_json::json!({
            "outcomes": self.records(reflect),
            "summary": self.summary,
        });
        Ok(serde_json::to_string_pretty(&document)?)
    }
}
