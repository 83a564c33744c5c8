//! Expectation registry.
//!
//! Expectations are appended during fixture loading and evaluated afterwards,
//! strictly in registration order. The two phases never overlap: registration
//! needs `&mut self`, evaluation only `&self`.

use core::fmt;
use core::slice::Iter;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, warn};

use crate::error::FixtureError;
use crate::outcome::{Outcome, Status};
use crate::report::{RunReport, Summary};
use crate::value::{Comparison, Value};

type Producer<C> = Box<dyn Fn(&mut C) -> Result<Value, FixtureError>>;

/// A registered expectation: a description, an expected value and a producer
/// computing the actual value from a context.
pub struct Expectation<C> {
    description: String,
    expected: Value,
    producer: Producer<C>,
}

impl<C> Expectation<C> {
    /// Description the expectation was registered with.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Expected value.
    pub const fn expected(&self) -> &Value {
        &self.expected
    }

    /// Whether the expectation carries a usable description.
    pub fn is_well_formed(&self) -> bool {
        !self.description.trim().is_empty()
    }

    fn produce(&self, context: &mut C, catch_panics: bool) -> Result<Value, FixtureError> {
        if !self.is_well_formed() {
            return Err(FixtureError::MissingDescription);
        }
        if !catch_panics {
            return (self.producer)(context);
        }
        catch_unwind(AssertUnwindSafe(|| (self.producer)(context)))
            .unwrap_or_else(|payload| Err(FixtureError::Panicked(panic_message(payload.as_ref()))))
    }

    fn evaluate(&self, index: usize, context: &mut C, catch_panics: bool) -> Outcome {
        match self.produce(context, catch_panics) {
            Ok(actual) => {
                let (comparison, equal) = Comparison::compare(&self.expected, &actual);
                Outcome {
                    index,
                    description: self.description.clone(),
                    status: if equal { Status::Pass } else { Status::Fail },
                    comparison: Some(comparison),
                    expected: self.expected.clone(),
                    actual: Some(actual),
                }
            }
            Err(error) => Outcome {
                index,
                description: self.description.clone(),
                status: Status::FixtureError(error),
                comparison: None,
                expected: self.expected.clone(),
                actual: None,
            },
        }
    }
}

impl<C> fmt::Debug for Expectation<C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Expectation")
            .field("description", &self.description)
            .field("expected", &self.expected)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

/// Ordered collection of expectations evaluated against a context `C`.
pub struct ExpectationRegistry<C> {
    expectations: Vec<Expectation<C>>,
    catch_panics: bool,
}

impl<C> ExpectationRegistry<C> {
    /// Create an empty registry that converts producer panics into fixture
    /// errors.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            expectations: Vec::new(),
            catch_panics: true,
        }
    }

    /// Enable or disable converting producer panics into fixture errors.
    #[must_use]
    pub fn with_panic_capture(mut self, enabled: bool) -> Self {
        self.catch_panics = enabled;
        self
    }

    /// Append an expectation.
    ///
    /// An empty description is accepted; the expectation then reports
    /// [`FixtureError::MissingDescription`] instead of running its producer.
    pub fn register<F>(
        &mut self,
        description: impl Into<String>,
        expected: Value,
        producer: F,
    ) -> &mut Self
    where
        F: Fn(&mut C) -> Result<Value, FixtureError> + 'static,
    {
        let expectation = Expectation {
            description: description.into(),
            expected,
            producer: Box::new(producer),
        };
        if !expectation.is_well_formed() {
            warn!(
                index = self.expectations.len(),
                "registered expectation without description"
            );
        }
        self.expectations.push(expectation);
        self
    }

    /// Number of registered expectations.
    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }

    /// Registered expectations, in registration order.
    pub fn expectations(&self) -> &[Expectation<C>] {
        &self.expectations
    }

    /// Descriptions in registration order.
    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.expectations.iter().map(Expectation::description)
    }

    /// Lazily evaluate every expectation in registration order.
    ///
    /// Each call re-invokes the producers. The returned iterator yields
    /// exactly one outcome per expectation and keeps going after failures.
    pub fn run_all<'run>(&'run self, context: &'run mut C) -> Run<'run, C> {
        Run {
            expectations: self.expectations.iter(),
            index: 0,
            context,
            catch_panics: self.catch_panics,
        }
    }

    /// Evaluate everything and summarize.
    pub fn evaluate(&self, context: &mut C) -> RunReport {
        let outcomes: Vec<Outcome> = self.run_all(context).collect();
        let summary = Summary::from_outcomes(&outcomes);
        debug!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            fixture_errors = summary.fixture_errors,
            "evaluated registry"
        );
        RunReport { outcomes, summary }
    }
}

impl<C> Default for ExpectationRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for ExpectationRegistry<C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ExpectationRegistry")
            .field("expectations", &self.expectations)
            .field("catch_panics", &self.catch_panics)
            .finish()
    }
}

/// Lazy evaluation of a registry, produced by [`ExpectationRegistry::run_all`].
pub struct Run<'run, C> {
    expectations: Iter<'run, Expectation<C>>,
    index: usize,
    context: &'run mut C,
    catch_panics: bool,
}

impl<C> Iterator for Run<'_, C> {
    type Item = Outcome;

    fn next(&mut self) -> Option<Self::Item> {
        let expectation = self.expectations.next()?;
        let index = self.index;
        self.index += 1;

        let outcome = expectation.evaluate(index, self.context, self.catch_panics);
        match &outcome.status {
            Status::Pass => debug!(index, description = %outcome.description, "expectation passed"),
            Status::Fail => debug!(index, description = %outcome.description, "expectation failed"),
            Status::FixtureError(error) => {
                warn!(index, description = %outcome.description, %error, "fixture error");
            }
        }
        Some(outcome)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.expectations.size_hint()
    }
}

impl<C> ExactSizeIterator for Run<'_, C> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_space::ObjectSpace;
    use crate::reflect::Reflect as _;
    use crate::value::ObjectId;

    struct Fixtures {
        space: ObjectSpace,
        class_a: ObjectId,
        class_b: ObjectId,
        instance: ObjectId,
    }

    fn fixtures() -> Fixtures {
        let mut space = ObjectSpace::new();
        let class_a = space.define_class(Some("A"), None).unwrap();
        let class_b = space.define_class(Some("B"), Some(class_a)).unwrap();
        let instance = space.new_instance(class_a).unwrap();
        Fixtures {
            space,
            class_a,
            class_b,
            instance,
        }
    }

    /// Tests the three reflective scenarios the class fixture declares.
    ///
    /// # Panics
    /// Panics if assertions fail during test execution.
    #[test]
    fn test_reflective_scenarios_pass() {
        let mut fixtures = fixtures();
        let class_a = Value::Object(fixtures.class_a);
        let class_b = Value::Object(fixtures.class_b);
        let instance = Value::Object(fixtures.instance);
        let singleton = fixtures.space.identity_descriptor(&instance).unwrap();

        let mut registry = ExpectationRegistry::new();
        registry
            .register("B.superclass", class_a.clone(), move |space: &mut ObjectSpace| {
                space.superclass_of(&class_b)
            })
            .register("A.new.class", class_a.clone(), move |space: &mut ObjectSpace| {
                let fresh = space.instantiate(&class_a)?;
                space.class_of(&fresh)
            })
            .register("instance.singleton_class", singleton, move |space: &mut ObjectSpace| {
                space.identity_descriptor(&instance)
            });

        let report = registry.evaluate(&mut fixtures.space);
        assert!(report.outcomes.iter().all(Outcome::passed));
        assert_eq!(report.summary.passed, 3);
        assert!(
            report
                .outcomes
                .iter()
                .all(|outcome| outcome.comparison == Some(Comparison::Identity))
        );
    }

    /// Tests that distinct entities never compare equal.
    ///
    /// # Panics
    /// Panics if assertions fail during test execution.
    #[test]
    fn test_distinct_entities_fail() {
        let mut fixtures = fixtures();
        let class_b = Value::Object(fixtures.class_b);
        let mut registry = ExpectationRegistry::new();
        registry.register("mismatch", Value::Object(fixtures.class_a), move |_: &mut ObjectSpace| {
            Ok(class_b.clone())
        });

        let outcomes: Vec<_> = registry.run_all(&mut fixtures.space).collect();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, Status::Fail);
    }

    /// Tests that a fresh allocation each call is caught as a failure.
    ///
    /// # Panics
    /// Panics if assertions fail during test execution.
    #[test]
    fn test_fresh_lookalike_fails_identity() {
        let mut fixtures = fixtures();
        let class_a = Value::Object(fixtures.class_a);
        let expected = fixtures.space.instantiate(&class_a).unwrap();
        let mut registry = ExpectationRegistry::new();
        registry.register("A.new", expected, move |space: &mut ObjectSpace| {
            space.instantiate(&class_a)
        });

        let report = registry.evaluate(&mut fixtures.space);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.outcomes[0].comparison, Some(Comparison::Identity));
    }

    /// Tests that producer errors are isolated to their own outcome.
    ///
    /// # Panics
    /// Panics if assertions fail during test execution.
    #[test]
    fn test_fixture_error_does_not_stop_the_run() {
        let mut fixtures = fixtures();
        let class_a = Value::Object(fixtures.class_a);
        let mut registry = ExpectationRegistry::new();
        registry
            .register("C.superclass", Value::Nil, |_: &mut ObjectSpace| {
                Err(FixtureError::UnknownEntity("C".to_owned()))
            })
            .register("A", class_a.clone(), move |_: &mut ObjectSpace| Ok(class_a.clone()));

        let outcomes: Vec<_> = registry.run_all(&mut fixtures.space).collect();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            outcomes[0].fixture_error(),
            Some(&FixtureError::UnknownEntity("C".to_owned()))
        );
        assert!(outcomes[1].passed());
    }

    /// Tests that outcomes come back in registration order.
    ///
    /// # Panics
    /// Panics if assertions fail during test execution.
    #[test]
    fn test_outcomes_follow_registration_order() {
        let mut registry: ExpectationRegistry<()> = ExpectationRegistry::new();
        for number in 0..5i64 {
            registry.register(format!("value {number}"), Value::Int(number), move |_: &mut ()| {
                Ok(Value::Int(number))
            });
        }

        let mut context = ();
        let run = registry.run_all(&mut context);
        assert_eq!(run.len(), 5);
        let indices: Vec<_> = run.map(|outcome| (outcome.index, outcome.description)).collect();
        let expected: Vec<_> = (0..5usize).map(|index| (index, format!("value {index}"))).collect();
        assert_eq!(indices, expected);
    }

    /// Tests that producers only run as the iterator is advanced.
    ///
    /// # Panics
    /// Panics if assertions fail during test execution.
    #[test]
    fn test_run_all_is_lazy() {
        let mut registry: ExpectationRegistry<u32> = ExpectationRegistry::new();
        for number in 0..3i64 {
            registry.register(format!("count {number}"), Value::Int(number), move |calls: &mut u32| {
                *calls += 1;
                Ok(Value::Int(number))
            });
        }

        let mut calls = 0u32;
        let first = registry.run_all(&mut calls).next().unwrap();
        assert_eq!(first.description, "count 0");
        assert!(first.passed());
        assert_eq!(calls, 1);

        let mut run = registry.run_all(&mut calls);
        assert_eq!(run.len(), 3);
        assert!(run.next().is_some());
        assert!(run.next().is_some());
        drop(run);
        assert_eq!(calls, 3);
    }

    /// Tests that running twice with pure producers gives identical outcomes.
    ///
    /// # Panics
    /// Panics if assertions fail during test execution.
    #[test]
    fn test_run_all_is_idempotent() {
        let mut fixtures = fixtures();
        let class_b = Value::Object(fixtures.class_b);
        let instance = Value::Object(fixtures.instance);
        let singleton = fixtures.space.identity_descriptor(&instance).unwrap();
        let mut registry = ExpectationRegistry::new();
        registry
            .register("B.superclass", Value::Object(fixtures.class_a), move |space: &mut ObjectSpace| {
                space.superclass_of(&class_b)
            })
            .register("singleton", singleton, move |space: &mut ObjectSpace| {
                space.identity_descriptor(&instance)
            })
            .register("", Value::Nil, |_: &mut ObjectSpace| Ok(Value::Nil));

        let first: Vec<_> = registry.run_all(&mut fixtures.space).collect();
        let second: Vec<_> = registry.run_all(&mut fixtures.space).collect();
        assert_eq!(first, second);
    }

    /// Tests that an empty description is reported, not evaluated.
    ///
    /// # Panics
    /// Panics if assertions fail during test execution.
    #[test]
    fn test_missing_description_is_fixture_error() {
        let mut registry: ExpectationRegistry<u32> = ExpectationRegistry::new();
        registry.register("  ", Value::Nil, |calls: &mut u32| {
            *calls += 1;
            Ok(Value::Nil)
        });

        let mut calls = 0u32;
        let report = registry.evaluate(&mut calls);
        assert_eq!(calls, 0);
        assert_eq!(
            report.outcomes[0].fixture_error(),
            Some(&FixtureError::MissingDescription)
        );
        assert_eq!(report.summary.fixture_errors, 1);
    }

    /// Tests that a panicking producer becomes a fixture error.
    ///
    /// # Panics
    /// Panics if assertions fail during test execution.
    #[test]
    fn test_panicking_producer_is_fixture_error() {
        let mut registry: ExpectationRegistry<()> = ExpectationRegistry::new();
        registry
            .register("boom", Value::Nil, |_: &mut ()| panic!("reflective lookup exploded"))
            .register("after", Value::Int(1), |_: &mut ()| Ok(Value::Int(1)));

        let report = registry.evaluate(&mut ());
        assert_eq!(
            report.outcomes[0].fixture_error(),
            Some(&FixtureError::Panicked("reflective lookup exploded".to_owned()))
        );
        assert!(report.outcomes[1].passed());
    }

    /// Tests primitive expectations compare by value.
    ///
    /// # Panics
    /// Panics if assertions fail during test execution.
    #[test]
    fn test_primitive_values_compare_structurally() {
        let mut registry: ExpectationRegistry<()> = ExpectationRegistry::new();
        registry
            .register("name", Value::from("A"), |_: &mut ()| Ok(Value::Str("A".to_owned())))
            .register("count", Value::Int(2), |_: &mut ()| Ok(Value::Int(3)));

        let report = registry.evaluate(&mut ());
        assert_eq!(report.outcomes[0].comparison, Some(Comparison::Value));
        assert!(report.outcomes[0].passed());
        assert!(report.outcomes[1].failed());
    }
}
