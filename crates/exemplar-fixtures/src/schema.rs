//! Fixture file format.
//!
//! ```toml
//! name = "class_pe"
//! module = "ClassPEFixtures"
//!
//! [[entities]]
//! kind = "class"
//! name = "A"
//!
//! [[entities]]
//! kind = "instance"
//! name = "AInstance"
//! class = "ClassPEFixtures::A"
//!
//! [[examples]]
//! description = "ClassPEFixtures::AInstance.class"
//! expected = "ClassPEFixtures::A"
//! ```
//!
//! Every string that refers to a value is an [`Expr`](crate::Expr).

use serde::{Deserialize, Serialize};

/// Complete fixture file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureFile {
    /// Fixture name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Module the entities are declared in
    #[serde(default)]
    pub module: Option<String>,
    /// Entity declarations, in order
    #[serde(default)]
    pub entities: Vec<EntityDecl>,
    /// Example declarations, in order
    #[serde(default)]
    pub examples: Vec<ExampleDecl>,
}

/// Entity declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityDecl {
    /// A class, optionally with a superclass expression
    Class {
        /// Constant name
        name: String,
        /// Superclass expression; defaults to `Object`
        #[serde(default)]
        superclass: Option<String>,
    },
    /// An instance of the class an expression evaluates to
    Instance {
        /// Constant name
        name: String,
        /// Class expression
        class: String,
    },
}

impl EntityDecl {
    /// Constant name being declared
    pub fn name(&self) -> &str {
        match self {
            Self::Class { name, .. } | Self::Instance { name, .. } => name,
        }
    }
}

/// Example declaration: the description is evaluated as the actual value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExampleDecl {
    /// Expression producing the actual value
    #[serde(default)]
    pub description: String,
    /// Expression producing the expected value
    pub expected: String,
}
