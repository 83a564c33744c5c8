//! Fixture loading for the exemplar harness.
//!
//! A fixture file declares a namespace of entities and a list of examples.
//! Loading builds the namespace in an [`ObjectSpace`](exemplar_core::ObjectSpace),
//! evaluates each example's expected expression, and registers the example's
//! description as the expression producing the actual value.

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

/// The class reflection fixture constructed directly in Rust.
pub mod class_pe;
/// Recursive fixture discovery.
pub mod discovery;
/// Load errors.
pub mod error;
/// Reflective expression language.
pub mod expr;
/// Fixture loader.
pub mod loader;
/// Constant namespace and evaluation scope.
pub mod namespace;
/// Fixture file schema.
pub mod schema;
/// Multi-file suite runner.
pub mod suite;

pub use class_pe::ClassPeFixtures;
pub use discovery::{discover_all, discover_fixtures};
pub use error::{LoadError, Result};
pub use expr::{Expr, Method, Receiver};
pub use loader::LoadedFixture;
pub use namespace::{Namespace, Scope};
pub use schema::{EntityDecl, ExampleDecl, FixtureFile};
pub use suite::{FileOutcome, FileReport, SuiteOptions, SuiteReport, run_suite};
