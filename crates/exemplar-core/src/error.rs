use core::result::Result as CoreResult;
use std::io::Error as IoError;

use thiserror::Error;
use toml::de::Error as TomlError;

/// Result type for core operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors raised outside of expectation evaluation.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlError),

    /// JSON rendering failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Reasons an expectation could not be evaluated.
///
/// These never abort a run: the registry turns them into a fixture-error
/// outcome and moves on to the next expectation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixtureError {
    /// The expectation was registered with an empty description.
    #[error("expectation has no description")]
    MissingDescription,

    /// A constant referenced by the producer is not defined.
    #[error("uninitialized constant {0}")]
    UnknownEntity(String),

    /// The receiver does not support the requested reflective operation.
    #[error("undefined method `{method}` for {receiver}")]
    UnsupportedOperation {
        /// Operation that was requested.
        method: String,
        /// Inspected receiver.
        receiver: String,
    },

    /// An argument had the wrong kind of value.
    #[error("wrong argument type {found} (expected {expected})")]
    TypeMismatch {
        /// Kind of value that was required.
        expected: &'static str,
        /// Inspected value that was supplied.
        found: String,
    },

    /// The producer expression could not be parsed.
    #[error("cannot parse `{expression}`: {reason}")]
    Parse {
        /// Expression text.
        expression: String,
        /// What went wrong.
        reason: String,
    },

    /// The producer panicked.
    #[error("producer panicked: {0}")]
    Panicked(String),

    /// An object handle does not belong to the object space it was used with.
    #[error("object #{0} does not belong to this object space")]
    DanglingObject(u32),

    /// The object space cannot allocate more entities.
    #[error("object space is exhausted")]
    SpaceExhausted,
}
