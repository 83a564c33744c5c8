//! Fixture suite integration tests.
//!
//! Discovers and runs every fixture shipped under `tests/fixtures`.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::tests_outside_test_module,
        reason = "Allow for integration tests"
    )
)]

use exemplar_core::Comparison;
use exemplar_fixtures::{
    FileOutcome, FileReport, LoadedFixture, SuiteOptions, SuiteReport, discover_fixtures, run_suite,
};
use integration_tests::{VerificationResult, negative_fixtures_dir, passing_fixtures_dir};
use std::path::PathBuf;

async fn run_dir(dir: PathBuf, jobs: usize) -> SuiteReport {
    let fixtures = discover_fixtures(&dir).expect("Failed to discover fixtures");
    assert!(!fixtures.is_empty(), "no fixtures in {}", dir.display());
    run_suite(
        fixtures,
        SuiteOptions {
            jobs,
            catch_panics: true,
        },
    )
    .await
}

fn file<'report>(report: &'report SuiteReport, name: &str) -> &'report FileReport {
    report
        .files
        .iter()
        .find(|file| file.path.file_stem().is_some_and(|stem| stem == name))
        .unwrap_or_else(|| panic!("fixture {name} not in report"))
}

/// Run all passing fixtures
///
/// # Panics
/// Panics if any fixture fails verification
#[tokio::test]
async fn test_all_passing_fixtures() {
    let report = run_dir(passing_fixtures_dir(), 4).await;
    let verification = VerificationResult::from_suite(&report);

    for failure in &verification.failures {
        tracing::error!("  - {failure}");
    }
    assert!(
        verification.passed,
        "{} expectation(s) failed:\n{}",
        verification.failures.len(),
        verification.failures.join("\n")
    );
    assert_eq!(verification.successes.len(), report.summary.total);
    report.enforce_gate().unwrap();
}

/// Tests that every canonical scenario compares by identity.
///
/// # Panics
/// Panics if assertions fail during test execution.
#[tokio::test]
async fn test_class_pe_fixture_compares_by_identity() {
    let report = run_dir(passing_fixtures_dir(), 1).await;
    let class_pe = file(&report, "class_pe");
    let FileOutcome::Evaluated { outcomes } = &class_pe.outcome else {
        panic!("class_pe did not load");
    };
    assert_eq!(outcomes.len(), 3);
    assert!(
        outcomes
            .iter()
            .all(|record| record.comparison == Some(Comparison::Identity) && record.passed())
    );
}

/// Tests that failures, fixture errors and load errors are each counted for
/// their own file only.
///
/// # Panics
/// Panics if assertions fail during test execution.
#[tokio::test]
async fn test_negative_fixtures_are_isolated() {
    let report = run_dir(negative_fixtures_dir(), 3).await;

    let mismatch = file(&report, "mismatch");
    assert_eq!(mismatch.summary.failed, 3);
    assert_eq!(mismatch.summary.passed, 0);

    let errors = file(&report, "fixture_errors");
    assert_eq!(errors.summary.passed, 1);
    assert_eq!(errors.summary.fixture_errors, 4);
    let FileOutcome::Evaluated { outcomes } = &errors.outcome else {
        panic!("fixture_errors did not load");
    };
    let statuses: Vec<_> = outcomes.iter().map(|record| record.status.as_str()).collect();
    assert_eq!(
        statuses,
        vec!["fixture_error", "pass", "fixture_error", "fixture_error", "fixture_error"]
    );
    assert_eq!(
        outcomes[0].error.as_deref(),
        Some("uninitialized constant C")
    );
    assert_eq!(
        outcomes[4].error.as_deref(),
        Some("expectation has no description")
    );

    let duplicate = file(&report, "duplicate_entity");
    assert!(matches!(duplicate.outcome, FileOutcome::LoadFailed { .. }));
    assert_eq!(duplicate.summary.load_errors, 1);

    assert_eq!(report.summary.load_errors, 1);
    let gate = report.enforce_gate().unwrap_err();
    assert_eq!(gate.failed, 3);
    assert_eq!(gate.fixture_errors, 4);
}

/// Tests that the kind mismatch between a name and a class is reported as
/// such.
///
/// # Panics
/// Panics if assertions fail during test execution.
#[tokio::test]
async fn test_kind_mismatch_is_reported() {
    let report = run_dir(negative_fixtures_dir(), 2).await;
    let FileOutcome::Evaluated { outcomes } = &file(&report, "mismatch").outcome else {
        panic!("mismatch did not load");
    };
    let comparisons: Vec<_> = outcomes.iter().map(|record| record.comparison).collect();
    assert_eq!(
        comparisons,
        vec![
            Some(Comparison::Identity),
            Some(Comparison::Identity),
            Some(Comparison::KindMismatch),
        ]
    );
}

/// Tests that loading a fixture directly gives the same result as the suite.
///
/// # Panics
/// Panics if assertions fail during test execution.
#[test]
fn test_direct_load_matches_suite_counts() {
    let path = passing_fixtures_dir().join("singleton_classes.toml");
    let mut fixture = LoadedFixture::load(&path).expect("Failed to load fixture");
    let first = fixture.run();
    let second = fixture.run();
    assert!(first.summary.all_passed(), "{}", fixture.render_text(&first));
    assert_eq!(first, second);
}
