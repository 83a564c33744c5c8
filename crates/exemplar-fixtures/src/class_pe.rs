//! The class reflection fixture, built directly against an object space.
//!
//! Declares `ClassPEFixtures::A`, its subclass `ClassPEFixtures::B` and an
//! instance `ClassPEFixtures::AInstance`, then registers the three canonical
//! expectations about them. Everything is an explicit value; nothing is
//! registered globally.

use exemplar_core::{ExpectationRegistry, FixtureError, ObjectId, ObjectSpace, Reflect as _, Value};

use crate::namespace::{Namespace, Scope};

/// Module the fixture entities are declared in.
pub const MODULE: &str = "ClassPEFixtures";

/// Entities of the class reflection fixture.
#[derive(Debug, Clone)]
pub struct ClassPeFixtures {
    space: ObjectSpace,
    /// `ClassPEFixtures::A`
    pub class_a: ObjectId,
    /// `ClassPEFixtures::B`, a subclass of `A`
    pub class_b: ObjectId,
    /// `ClassPEFixtures::AInstance`, an instance of `A`
    pub a_instance: ObjectId,
}

impl ClassPeFixtures {
    /// Declare the fixture entities in a fresh object space.
    ///
    /// # Errors
    /// Returns an error if the object space rejects a declaration.
    pub fn setup() -> Result<Self, FixtureError> {
        let mut space = ObjectSpace::new();
        let class_a = space.define_class(Some(&format!("{MODULE}::A")), None)?;
        let class_b = space.define_class(Some(&format!("{MODULE}::B")), Some(class_a))?;
        let a_instance = space.new_instance(class_a)?;
        Ok(Self {
            space,
            class_a,
            class_b,
            a_instance,
        })
    }

    /// Object space holding the entities.
    pub const fn space(&self) -> &ObjectSpace {
        &self.space
    }

    /// Mutable object space, the evaluation context of
    /// [`register_examples`](Self::register_examples).
    pub const fn space_mut(&mut self) -> &mut ObjectSpace {
        &mut self.space
    }

    /// Register the three canonical expectations.
    ///
    /// The singleton class of `AInstance` is requested here, so the expected
    /// handle exists before evaluation asks for it again.
    ///
    /// # Errors
    /// Returns an error if the singleton class cannot be allocated.
    pub fn register_examples(&mut self) -> Result<ExpectationRegistry<ObjectSpace>, FixtureError> {
        let class_a = Value::Object(self.class_a);
        let class_b = Value::Object(self.class_b);
        let a_instance = Value::Object(self.a_instance);
        let singleton = self.space.identity_descriptor(&a_instance)?;

        let mut registry = ExpectationRegistry::new();
        let new_class = class_a.clone();
        registry
            .register(format!("{MODULE}::B.superclass"), class_a.clone(), move |space: &mut ObjectSpace| {
                space.superclass_of(&class_b)
            })
            .register(format!("{MODULE}::A.new.class"), class_a, move |space: &mut ObjectSpace| {
                let fresh = space.instantiate(&new_class)?;
                space.class_of(&fresh)
            })
            .register(
                format!("{MODULE}::AInstance.singleton_class"),
                singleton,
                move |space: &mut ObjectSpace| space.identity_descriptor(&a_instance),
            );
        Ok(registry)
    }

    /// Namespace binding the entities under [`MODULE`], plus built-ins.
    pub fn namespace(&self) -> Namespace {
        let mut namespace = Namespace::with_builtins(Some(MODULE.to_owned()), &self.space);
        namespace.define(format!("{MODULE}::A"), Value::Object(self.class_a));
        namespace.define(format!("{MODULE}::B"), Value::Object(self.class_b));
        namespace.define(format!("{MODULE}::AInstance"), Value::Object(self.a_instance));
        namespace
    }

    /// Convert into an expression evaluation scope.
    pub fn into_scope(self) -> Scope {
        let namespace = self.namespace();
        Scope::new(self.space, namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;
    use exemplar_core::Comparison;

    /// Tests that the canonical expectations pass by identity.
    ///
    /// # Panics
    /// Panics if assertions fail during test execution.
    #[test]
    fn test_canonical_expectations_pass() {
        let mut fixtures = ClassPeFixtures::setup().unwrap();
        let registry = fixtures.register_examples().unwrap();
        let descriptions: Vec<_> = registry.descriptions().collect();
        assert_eq!(
            descriptions,
            vec![
                "ClassPEFixtures::B.superclass",
                "ClassPEFixtures::A.new.class",
                "ClassPEFixtures::AInstance.singleton_class",
            ]
        );

        let report = registry.evaluate(fixtures.space_mut());
        assert!(report.summary.all_passed(), "{}", report.render_text(fixtures.space()));
        assert!(
            report
                .outcomes
                .iter()
                .all(|outcome| outcome.comparison == Some(Comparison::Identity))
        );
    }

    /// Tests that every evaluation of `A.new` allocates a new instance while
    /// the expectations keep passing.
    ///
    /// # Panics
    /// Panics if assertions fail during test execution.
    #[test]
    fn test_repeated_runs_agree() {
        let mut fixtures = ClassPeFixtures::setup().unwrap();
        let registry = fixtures.register_examples().unwrap();
        let before = fixtures.space().len();
        let first = registry.evaluate(fixtures.space_mut());
        let second = registry.evaluate(fixtures.space_mut());
        assert_eq!(first, second);
        assert_eq!(fixtures.space().len(), before + 2);
    }

    /// Tests that the namespace resolves the same entities as the handles.
    ///
    /// # Panics
    /// Panics if assertions fail during test execution.
    #[test]
    fn test_scope_matches_handles() {
        let fixtures = ClassPeFixtures::setup().unwrap();
        let class_a = fixtures.class_a;
        let mut scope = fixtures.into_scope();
        let expr = Expr::parse("B.superclass").unwrap();
        assert_eq!(scope.evaluate(&expr).unwrap(), Value::Object(class_a));
    }
}
