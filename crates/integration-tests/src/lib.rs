//! Integration test support for the exemplar harness
//!
//! Locates the fixture tree shipped with this crate and condenses suite
//! reports into pass/fail verification results.

#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        reason = "Allow for tests"
    )
)]

pub mod verification_result;

use std::path::PathBuf;

pub use verification_result::VerificationResult;

/// Root of the fixture tree: `tests/fixtures` in this crate.
#[must_use]
pub fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Fixtures that must load and pass.
#[must_use]
pub fn passing_fixtures_dir() -> PathBuf {
    fixtures_root().join("passing")
}

/// Fixtures that exercise failures, fixture errors and load errors.
#[must_use]
pub fn negative_fixtures_dir() -> PathBuf {
    fixtures_root().join("negative")
}
