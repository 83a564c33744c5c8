//! Core types for the exemplar expectation harness.
//!
//! This crate provides the expectation registry, the identity-aware comparison
//! policy, outcome reporting, and a minimal object space that stands in for the
//! runtime whose reflective lookups are being checked.

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

/// Harness configuration loaded from TOML.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Minimal arena of classes, instances and singleton classes.
pub mod object_space;
/// Per-expectation outcomes.
pub mod outcome;
/// Reflective capability consumed by producers.
pub mod reflect;
/// Expectation registry and its lazy evaluation.
pub mod registry;
/// Summaries, gates and report rendering.
pub mod report;
/// Values compared by the registry.
pub mod value;

pub use config::{HarnessConfig, OutputFormat};
pub use error::{Error, FixtureError, Result};
pub use object_space::{Builtins, ObjectSpace};
pub use outcome::{Outcome, Status, StatusKind};
pub use reflect::Reflect;
pub use registry::{Expectation, ExpectationRegistry, Run};
pub use report::{GateError, OutcomeRecord, RunReport, Summary};
pub use value::{Comparison, ObjectId, Value};
