use core::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle to an entity allocated in an [`ObjectSpace`](crate::ObjectSpace).
///
/// Handles are equal only when they come from the same allocation, so two
/// entities that look alike are still distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw arena slot of this handle.
    pub const fn raw(self) -> u32 {
        self.0
    }

    pub(crate) const fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

/// A value produced or expected by an expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Absence of a value.
    Nil,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Immutable string.
    Str(String),
    /// Reference to an entity in an object space.
    Object(ObjectId),
}

impl Value {
    /// Whether this value is compared by value rather than by identity.
    pub const fn is_primitive(&self) -> bool {
        !matches!(self, Self::Object(_))
    }

    /// The object handle, if this value is a reference.
    pub const fn as_object(&self) -> Option<ObjectId> {
        match self {
            Self::Object(id) => Some(*id),
            Self::Nil | Self::Bool(_) | Self::Int(_) | Self::Str(_) => None,
        }
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Self::Object(id)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Self::Int(number)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Str(text.to_owned())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(formatter, "nil"),
            Self::Bool(flag) => write!(formatter, "{flag}"),
            Self::Int(number) => write!(formatter, "{number}"),
            Self::Str(text) => write!(formatter, "{text:?}"),
            Self::Object(id) => write!(formatter, "#<object {id}>"),
        }
    }
}

/// How an expected value and an actual value were compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Both sides are references; equal only if they are the same entity.
    Identity,
    /// Both sides are primitives; equal if their values are equal.
    Value,
    /// One side is a reference and the other a primitive; never equal.
    KindMismatch,
}

impl Comparison {
    /// Pick the comparison that applies to a pair of values.
    pub const fn select(expected: &Value, actual: &Value) -> Self {
        match (expected.is_primitive(), actual.is_primitive()) {
            (false, false) => Self::Identity,
            (true, true) => Self::Value,
            _ => Self::KindMismatch,
        }
    }

    /// Compare two values under this policy.
    pub fn holds(self, expected: &Value, actual: &Value) -> bool {
        match self {
            Self::Identity => match (expected.as_object(), actual.as_object()) {
                (Some(left), Some(right)) => left == right,
                _ => false,
            },
            Self::Value => expected.is_primitive() && expected == actual,
            Self::KindMismatch => false,
        }
    }

    /// Select the policy for the pair and apply it.
    pub fn compare(expected: &Value, actual: &Value) -> (Self, bool) {
        let comparison = Self::select(expected, actual);
        (comparison, comparison.holds(expected, actual))
    }
}
