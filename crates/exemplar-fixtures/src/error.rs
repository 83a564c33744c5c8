use core::result::Result as CoreResult;
use std::io::Error as IoError;
use std::path::PathBuf;

use exemplar_core::FixtureError;
use thiserror::Error;
use toml::de::Error as TomlError;
use walkdir::Error as WalkDirError;

/// Result type for fixture loading.
pub type Result<T> = CoreResult<T, LoadError>;

/// Errors that abort loading a single fixture file.
///
/// A load error never affects other fixture files in the same suite.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The fixture file could not be read.
    #[error("failed to read fixture {}: {source}", path.display())]
    Io {
        /// Fixture path.
        path: PathBuf,
        /// Underlying I/O error.
        source: IoError,
    },

    /// The fixture file is not valid TOML for the fixture schema.
    #[error("failed to parse fixture {origin}: {source}")]
    Parse {
        /// Fixture origin.
        origin: String,
        /// Underlying TOML error.
        source: TomlError,
    },

    /// The fixture has no name.
    #[error("fixture {origin} has no name")]
    MissingName {
        /// Fixture origin.
        origin: String,
    },

    /// An entity or module name cannot be referenced as a constant.
    #[error("fixture {origin} uses `{name}` as a {role} name; constants start with an uppercase letter")]
    InvalidName {
        /// Fixture origin.
        origin: String,
        /// Offending name.
        name: String,
        /// `entity` or `module`.
        role: &'static str,
    },

    /// Two entities were declared under the same constant.
    #[error("fixture {origin} declares constant {name} more than once")]
    DuplicateEntity {
        /// Fixture origin.
        origin: String,
        /// Qualified constant name.
        name: String,
    },

    /// An entity declaration could not be evaluated.
    #[error("fixture {origin} cannot declare {name}: {source}")]
    Entity {
        /// Fixture origin.
        origin: String,
        /// Constant being declared.
        name: String,
        /// Evaluation failure.
        source: FixtureError,
    },

    /// An example's expected value could not be evaluated.
    #[error("fixture {origin} cannot evaluate expected value of `{description}`: {source}")]
    Expected {
        /// Fixture origin.
        origin: String,
        /// Example description.
        description: String,
        /// Evaluation failure.
        source: FixtureError,
    },

    /// Walking a fixture directory failed.
    #[error("fixture discovery failed: {0}")]
    Discovery(#[from] WalkDirError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_error_display() {
        let error = LoadError::Entity {
            origin: "class_pe.toml".to_owned(),
            name: "ClassPEFixtures::B".to_owned(),
            source: FixtureError::UnknownEntity("C".to_owned()),
        };
        assert_eq!(
            error.to_string(),
            "fixture class_pe.toml cannot declare ClassPEFixtures::B: uninitialized constant C"
        );
    }

    #[test]
    fn test_io_error_display_includes_path() {
        let error = LoadError::Io {
            path: PathBuf::from("missing.toml"),
            source: IoError::other("gone"),
        };
        assert_eq!(error.to_string(), "failed to read fixture missing.toml: gone");
    }
}
