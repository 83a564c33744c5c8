use crate::error::FixtureError;
use crate::value::Value;

/// Reflective lookups supplied by the runtime under test.
///
/// Producers use this capability to compute actual values. The only
/// guarantee the harness depends on is that [`Reflect::identity_descriptor`]
/// returns the same handle every time it is asked about the same entity.
pub trait Reflect {
    /// Class of a value.
    ///
    /// # Errors
    /// Returns an error if the value cannot be resolved.
    fn class_of(&mut self, value: &Value) -> Result<Value, FixtureError>;

    /// Superclass of a class, or `Nil` at the root of the hierarchy.
    ///
    /// # Errors
    /// Returns an error if the value is not class-like.
    fn superclass_of(&mut self, value: &Value) -> Result<Value, FixtureError>;

    /// Per-entity descriptor (singleton class), stable across calls.
    ///
    /// # Errors
    /// Returns an error if the value cannot carry a descriptor.
    fn identity_descriptor(&mut self, value: &Value) -> Result<Value, FixtureError>;

    /// Allocate a fresh instance of a class.
    ///
    /// # Errors
    /// Returns an error if the value cannot be instantiated.
    fn instantiate(&mut self, class: &Value) -> Result<Value, FixtureError>;

    /// Name of a class, or `Nil` when anonymous.
    ///
    /// # Errors
    /// Returns an error if the value is not class-like.
    fn name_of(&mut self, value: &Value) -> Result<Value, FixtureError>;

    /// Human-readable representation used in reports.
    fn inspect(&self, value: &Value) -> String;
}
