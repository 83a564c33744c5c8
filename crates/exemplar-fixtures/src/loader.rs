//! Fixture loading: TOML file to a populated scope plus an expectation registry.

use core::mem;
use core::result::Result as CoreResult;
use std::fs;
use std::path::{Path, PathBuf};

use exemplar_core::{
    ExpectationRegistry, FixtureError, ObjectId, ObjectSpace, Reflect as _, Run, RunReport, Value,
};
use tracing::{debug, info};

use crate::error::{LoadError, Result};
use crate::expr::{Expr, is_constant_identifier, is_constant_path};
use crate::namespace::{Namespace, Scope};
use crate::schema::{EntityDecl, ExampleDecl, FixtureFile};

/// A fixture file after loading: entities are declared, expected values are
/// evaluated, and every example is registered for evaluation.
#[derive(Debug)]
pub struct LoadedFixture {
    name: String,
    description: String,
    path: Option<PathBuf>,
    scope: Scope,
    registry: ExpectationRegistry<Scope>,
}

impl LoadedFixture {
    /// Load a fixture file from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or fails to load.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, Some(path))
    }

    /// Load a fixture from TOML text. `path` is only used for reporting.
    ///
    /// # Errors
    /// Returns an error if the text is not a valid fixture, an entity cannot
    /// be declared, or an expected value cannot be evaluated.
    pub fn from_toml(content: &str, path: Option<&Path>) -> Result<Self> {
        let origin = path.map_or_else(|| "<inline>".to_owned(), |file| file.display().to_string());
        let file: FixtureFile = toml::from_str(content).map_err(|source| LoadError::Parse {
            origin: origin.clone(),
            source,
        })?;
        if file.name.trim().is_empty() {
            return Err(LoadError::MissingName { origin });
        }
        if let Some(module) = file.module.as_deref()
            && !is_constant_path(module)
        {
            return Err(LoadError::InvalidName {
                origin,
                name: module.to_owned(),
                role: "module",
            });
        }

        let space = ObjectSpace::new();
        let namespace = Namespace::with_builtins(file.module.clone(), &space);
        let mut scope = Scope::new(space, namespace);
        for entity in &file.entities {
            declare_entity(&mut scope, entity, &origin)?;
        }

        let mut registry = ExpectationRegistry::new();
        for example in &file.examples {
            register_example(&mut registry, &mut scope, example, &origin)?;
        }

        info!(
            fixture = %file.name,
            origin = %origin,
            entities = file.entities.len(),
            examples = registry.len(),
            "loaded fixture"
        );
        Ok(Self {
            name: file.name,
            description: file.description,
            path: path.map(Path::to_path_buf),
            scope,
            registry,
        })
    }

    /// Fixture name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// File the fixture was loaded from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Scope holding the declared entities.
    pub const fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Registered expectations.
    pub const fn registry(&self) -> &ExpectationRegistry<Scope> {
        &self.registry
    }

    /// Object space, for inspecting values in reports.
    pub const fn space(&self) -> &ObjectSpace {
        self.scope.space()
    }

    /// Enable or disable converting producer panics into fixture errors.
    #[must_use]
    pub fn with_panic_capture(mut self, enabled: bool) -> Self {
        self.registry = mem::take(&mut self.registry).with_panic_capture(enabled);
        self
    }

    /// Lazily evaluate every example in declaration order.
    pub fn run_all(&mut self) -> Run<'_, Scope> {
        self.registry.run_all(&mut self.scope)
    }

    /// Evaluate every example and summarize.
    pub fn run(&mut self) -> RunReport {
        self.registry.evaluate(&mut self.scope)
    }

    /// Plain-text report of a run of this fixture.
    pub fn render_text(&self, report: &RunReport) -> String {
        report.render_text(self.space())
    }
}

fn declare_entity(scope: &mut Scope, entity: &EntityDecl, origin: &str) -> Result<()> {
    if !is_constant_identifier(entity.name()) {
        return Err(LoadError::InvalidName {
            origin: origin.to_owned(),
            name: entity.name().to_owned(),
            role: "entity",
        });
    }
    let qualified = scope.namespace().qualify(entity.name());
    if scope.namespace().contains(&qualified) {
        return Err(LoadError::DuplicateEntity {
            origin: origin.to_owned(),
            name: qualified,
        });
    }
    let entity_error = |source: FixtureError| LoadError::Entity {
        origin: origin.to_owned(),
        name: qualified.clone(),
        source,
    };

    let value = match entity {
        EntityDecl::Class { superclass, .. } => {
            let parent = match superclass {
                Some(text) => Some(evaluate_class(scope, text).map_err(entity_error)?),
                None => None,
            };
            scope
                .space_mut()
                .define_class(Some(qualified.as_str()), parent)
                .map(Value::Object)
                .map_err(entity_error)?
        }
        EntityDecl::Instance { class, .. } => {
            let class_value = evaluate_text(scope, class).map_err(entity_error)?;
            let instance = scope
                .space_mut()
                .instantiate(&class_value)
                .map_err(entity_error)?;
            if let Some(id) = instance.as_object() {
                scope
                    .space_mut()
                    .name_constant(id, &qualified)
                    .map_err(entity_error)?;
            }
            instance
        }
    };

    debug!(origin, name = %qualified, value = %scope.space().inspect(&value), "declared entity");
    scope.namespace_mut().define(qualified, value);
    Ok(())
}

fn evaluate_text(scope: &mut Scope, text: &str) -> CoreResult<Value, FixtureError> {
    let expr = Expr::parse(text)?;
    scope.evaluate(&expr)
}

fn evaluate_class(scope: &mut Scope, text: &str) -> CoreResult<ObjectId, FixtureError> {
    let value = evaluate_text(scope, text)?;
    value.as_object().ok_or_else(|| FixtureError::TypeMismatch {
        expected: "class",
        found: scope.space().inspect(&value),
    })
}

fn register_example(
    registry: &mut ExpectationRegistry<Scope>,
    scope: &mut Scope,
    example: &ExampleDecl,
    origin: &str,
) -> Result<()> {
    let expected = evaluate_text(scope, &example.expected).map_err(|source| LoadError::Expected {
        origin: origin.to_owned(),
        description: example.description.clone(),
        source,
    })?;

    match Expr::parse(&example.description) {
        Ok(expr) => {
            registry.register(example.description.clone(), expected, move |scope: &mut Scope| {
                scope.evaluate(&expr)
            });
        }
        Err(error) => {
            registry.register(example.description.clone(), expected, move |_: &mut Scope| {
                Err(error.clone())
            });
        }
    }
    Ok(())
}
