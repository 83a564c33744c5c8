use std::collections::BTreeMap;
use std::collections::btree_map::Iter;

use exemplar_core::{FixtureError, ObjectSpace, Value};

use crate::expr::Expr;

/// Constants visible to fixture expressions.
///
/// Names are stored fully qualified. Lookups first try the name inside the
/// fixture's module and then at top level, so `A` and `ClassPEFixtures::A`
/// resolve to the same entity inside `module ClassPEFixtures`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    module: Option<String>,
    constants: BTreeMap<String, Value>,
}

impl Namespace {
    /// Empty namespace for an optional module.
    pub const fn new(module: Option<String>) -> Self {
        Self {
            module,
            constants: BTreeMap::new(),
        }
    }

    /// Namespace pre-populated with the object space's built-in classes.
    pub fn with_builtins(module: Option<String>, space: &ObjectSpace) -> Self {
        let mut namespace = Self::new(module);
        for (name, id) in space.builtin_constants() {
            namespace.constants.insert(name, Value::Object(id));
        }
        namespace
    }

    /// Module the fixture declares its entities in.
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Qualify a constant name with the module.
    pub fn qualify(&self, name: &str) -> String {
        match &self.module {
            Some(module) => format!("{module}::{name}"),
            None => name.to_owned(),
        }
    }

    /// Whether a fully qualified constant is defined.
    pub fn contains(&self, qualified: &str) -> bool {
        self.constants.contains_key(qualified)
    }

    /// Bind a fully qualified constant, returning any previous binding.
    pub fn define(&mut self, qualified: impl Into<String>, value: Value) -> Option<Value> {
        self.constants.insert(qualified.into(), value)
    }

    /// Resolve a constant path.
    ///
    /// # Errors
    /// Returns [`FixtureError::UnknownEntity`] if no binding matches.
    pub fn resolve(&self, path: &[String]) -> Result<Value, FixtureError> {
        let joined = path.join("::");
        if let Some(module) = &self.module
            && let Some(value) = self.constants.get(&format!("{module}::{joined}"))
        {
            return Ok(value.clone());
        }
        match self.constants.get(&joined) {
            Some(value) => Ok(value.clone()),
            None => Err(FixtureError::UnknownEntity(joined)),
        }
    }

    /// Bindings in name order.
    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.constants.iter()
    }

    /// Number of bindings, built-ins included.
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}

impl<'namespace> IntoIterator for &'namespace Namespace {
    type Item = (&'namespace String, &'namespace Value);
    type IntoIter = Iter<'namespace, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Evaluation context of a loaded fixture: the object space plus the
/// constants declared in it.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    space: ObjectSpace,
    namespace: Namespace,
}

impl Scope {
    /// Pair an object space with its namespace.
    pub const fn new(space: ObjectSpace, namespace: Namespace) -> Self {
        Self { space, namespace }
    }

    /// Object space.
    pub const fn space(&self) -> &ObjectSpace {
        &self.space
    }

    /// Mutable object space.
    pub const fn space_mut(&mut self) -> &mut ObjectSpace {
        &mut self.space
    }

    /// Namespace.
    pub const fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Mutable namespace.
    pub const fn namespace_mut(&mut self) -> &mut Namespace {
        &mut self.namespace
    }

    /// Evaluate an expression in this scope.
    ///
    /// # Errors
    /// Returns an error if the expression references an unknown constant or
    /// performs an unsupported call.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, FixtureError> {
        expr.evaluate(&mut self.space, &self.namespace)
    }
}
