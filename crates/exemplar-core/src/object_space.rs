//! A minimal arena of reflective entities.
//!
//! The object space models only what the harness needs from a runtime under
//! test: classes with a single superclass, instances of those classes, and
//! lazily allocated singleton classes that stay stable once created. Every
//! allocation receives a fresh [`ObjectId`], so identity is the arena slot.

use tracing::trace;

use crate::error::FixtureError;
use crate::reflect::Reflect;
use crate::value::{ObjectId, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityKind {
    Class { superclass: Option<ObjectId> },
    Instance { class: ObjectId },
    Singleton { attached: ObjectId },
}

#[derive(Debug, Clone)]
struct Entity {
    kind: EntityKind,
    name: Option<String>,
    singleton: Option<ObjectId>,
}

/// Handles of the classes every object space starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtins {
    /// Root of the class hierarchy.
    pub basic_object: ObjectId,
    /// Default superclass of user classes.
    pub object: ObjectId,
    /// Class of every class.
    pub class: ObjectId,
    /// Class of `nil`.
    pub nil_class: ObjectId,
    /// Class of `true`.
    pub true_class: ObjectId,
    /// Class of `false`.
    pub false_class: ObjectId,
    /// Class of integers.
    pub integer: ObjectId,
    /// Class of strings.
    pub string: ObjectId,
}

/// Arena of classes, instances and singleton classes.
#[derive(Debug, Clone)]
pub struct ObjectSpace {
    entities: Vec<Entity>,
    builtins: Builtins,
    builtin_count: usize,
}

impl ObjectSpace {
    /// Create an object space containing only the built-in classes.
    #[must_use]
    pub fn new() -> Self {
        let placeholder = ObjectId::from_raw(0);
        let mut space = Self {
            entities: Vec::new(),
            builtins: Builtins {
                basic_object: placeholder,
                object: placeholder,
                class: placeholder,
                nil_class: placeholder,
                true_class: placeholder,
                false_class: placeholder,
                integer: placeholder,
                string: placeholder,
            },
            builtin_count: 0,
        };

        let basic_object = space.push_builtin("BasicObject", None);
        let object = space.push_builtin("Object", Some(basic_object));
        let module = space.push_builtin("Module", Some(object));
        space.builtins = Builtins {
            basic_object,
            object,
            class: space.push_builtin("Class", Some(module)),
            nil_class: space.push_builtin("NilClass", Some(object)),
            true_class: space.push_builtin("TrueClass", Some(object)),
            false_class: space.push_builtin("FalseClass", Some(object)),
            integer: space.push_builtin("Integer", Some(object)),
            string: space.push_builtin("String", Some(object)),
        };
        space.builtin_count = space.entities.len();
        space
    }

    fn push_builtin(&mut self, name: &str, superclass: Option<ObjectId>) -> ObjectId {
        let id = ObjectId::from_raw(self.entities.len() as u32);
        self.entities.push(Entity {
            kind: EntityKind::Class { superclass },
            name: Some(name.to_owned()),
            singleton: None,
        });
        id
    }

    /// Built-in class handles.
    pub const fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    /// Built-in classes paired with their constant names.
    pub fn builtin_constants(&self) -> Vec<(String, ObjectId)> {
        self.entities
            .iter()
            .take(self.builtin_count)
            .enumerate()
            .filter_map(|(slot, entity)| {
                entity
                    .name
                    .clone()
                    .map(|name| (name, ObjectId::from_raw(slot as u32)))
            })
            .collect()
    }

    /// Number of allocated entities, built-ins included.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the space holds no entities. Always false after construction.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn entity(&self, id: ObjectId) -> Result<&Entity, FixtureError> {
        self.entities
            .get(id.slot())
            .ok_or(FixtureError::DanglingObject(id.raw()))
    }

    fn entity_mut(&mut self, id: ObjectId) -> Result<&mut Entity, FixtureError> {
        self.entities
            .get_mut(id.slot())
            .ok_or(FixtureError::DanglingObject(id.raw()))
    }

    fn allocate(&mut self, kind: EntityKind, name: Option<String>) -> Result<ObjectId, FixtureError> {
        let raw = u32::try_from(self.entities.len()).map_err(|_| FixtureError::SpaceExhausted)?;
        self.entities.push(Entity {
            kind,
            name,
            singleton: None,
        });
        trace!(object = raw, ?kind, "allocated entity");
        Ok(ObjectId::from_raw(raw))
    }

    /// Define a class. Without a superclass the class inherits from `Object`.
    ///
    /// # Errors
    /// Returns an error if the superclass is not an ordinary class, or is
    /// `Class` itself.
    pub fn define_class(
        &mut self,
        name: Option<&str>,
        superclass: Option<ObjectId>,
    ) -> Result<ObjectId, FixtureError> {
        let parent = superclass.unwrap_or(self.builtins.object);
        match self.entity(parent)?.kind {
            EntityKind::Class { .. } if parent != self.builtins.class => {}
            EntityKind::Class { .. } | EntityKind::Instance { .. } | EntityKind::Singleton { .. } => {
                return Err(FixtureError::TypeMismatch {
                    expected: "subclassable class",
                    found: self.inspect(&Value::Object(parent)),
                });
            }
        }
        self.allocate(
            EntityKind::Class {
                superclass: Some(parent),
            },
            name.map(ToOwned::to_owned),
        )
    }

    /// Give an anonymous class the name of the constant it was assigned to.
    ///
    /// Named classes keep their first name, and non-class entities are left
    /// untouched.
    ///
    /// # Errors
    /// Returns an error if the handle does not belong to this space.
    pub fn name_constant(&mut self, id: ObjectId, name: &str) -> Result<(), FixtureError> {
        let entity = self.entity_mut(id)?;
        if matches!(entity.kind, EntityKind::Class { .. }) && entity.name.is_none() {
            entity.name = Some(name.to_owned());
        }
        Ok(())
    }

    /// Allocate a new instance of a class. Instantiating `Class` defines a
    /// new anonymous class.
    ///
    /// # Errors
    /// Returns an error if the handle is not an ordinary class.
    pub fn new_instance(&mut self, class: ObjectId) -> Result<ObjectId, FixtureError> {
        if class == self.builtins.class {
            return self.define_class(None, None);
        }
        let kind = self.entity(class)?.kind;
        match kind {
            EntityKind::Class { .. } => self.allocate(EntityKind::Instance { class }, None),
            EntityKind::Instance { .. } | EntityKind::Singleton { .. } => {
                Err(self.unsupported("new", &Value::Object(class)))
            }
        }
    }

    /// Singleton class of an entity, allocated on first request.
    ///
    /// # Errors
    /// Returns an error if the handle does not belong to this space.
    pub fn singleton_class(&mut self, id: ObjectId) -> Result<ObjectId, FixtureError> {
        if let Some(existing) = self.entity(id)?.singleton {
            return Ok(existing);
        }
        let singleton = self.allocate(EntityKind::Singleton { attached: id }, None)?;
        self.entity_mut(id)?.singleton = Some(singleton);
        Ok(singleton)
    }

    fn primitive_class(&self, value: &Value) -> Option<ObjectId> {
        match value {
            Value::Nil => Some(self.builtins.nil_class),
            Value::Bool(true) => Some(self.builtins.true_class),
            Value::Bool(false) => Some(self.builtins.false_class),
            Value::Int(_) => Some(self.builtins.integer),
            Value::Str(_) => Some(self.builtins.string),
            Value::Object(_) => None,
        }
    }

    fn unsupported(&self, method: &str, receiver: &Value) -> FixtureError {
        FixtureError::UnsupportedOperation {
            method: method.to_owned(),
            receiver: self.inspect(receiver),
        }
    }

    fn superclass_of_id(&mut self, id: ObjectId) -> Result<Option<ObjectId>, FixtureError> {
        let kind = self.entity(id)?.kind;
        match kind {
            EntityKind::Class { superclass } => Ok(superclass),
            EntityKind::Instance { .. } => Err(self.unsupported("superclass", &Value::Object(id))),
            EntityKind::Singleton { attached } => {
                let attached_kind = self.entity(attached)?.kind;
                match attached_kind {
                    EntityKind::Instance { class } => Ok(Some(class)),
                    EntityKind::Class { .. } | EntityKind::Singleton { .. } => {
                        match self.superclass_of_id(attached)? {
                            Some(parent) => self.singleton_class(parent).map(Some),
                            None => Ok(Some(self.builtins.class)),
                        }
                    }
                }
            }
        }
    }

    fn inspect_id(&self, id: ObjectId) -> String {
        let Ok(entity) = self.entity(id) else {
            return format!("#<dangling {id}>");
        };
        match entity.kind {
            EntityKind::Class { .. } => entity
                .name
                .clone()
                .unwrap_or_else(|| format!("#<Class:{id}>")),
            EntityKind::Instance { class } => {
                format!("#<{}:{id}>", self.inspect_id(class))
            }
            EntityKind::Singleton { attached } => {
                format!("#<Class:{}>", self.inspect_id(attached))
            }
        }
    }
}

impl Default for ObjectSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl Reflect for ObjectSpace {
    fn class_of(&mut self, value: &Value) -> Result<Value, FixtureError> {
        let Some(id) = value.as_object() else {
            return self
                .primitive_class(value)
                .map(Value::Object)
                .ok_or_else(|| self.unsupported("class", value));
        };
        match self.entity(id)?.kind {
            EntityKind::Instance { class } => Ok(Value::Object(class)),
            EntityKind::Class { .. } | EntityKind::Singleton { .. } => {
                Ok(Value::Object(self.builtins.class))
            }
        }
    }

    fn superclass_of(&mut self, value: &Value) -> Result<Value, FixtureError> {
        let Some(id) = value.as_object() else {
            return Err(self.unsupported("superclass", value));
        };
        Ok(self
            .superclass_of_id(id)?
            .map_or(Value::Nil, Value::Object))
    }

    fn identity_descriptor(&mut self, value: &Value) -> Result<Value, FixtureError> {
        match value {
            Value::Object(id) => self.singleton_class(*id).map(Value::Object),
            // nil, true and false answer with their own class
            Value::Nil | Value::Bool(_) => self
                .primitive_class(value)
                .map(Value::Object)
                .ok_or_else(|| self.unsupported("singleton_class", value)),
            Value::Int(_) | Value::Str(_) => Err(self.unsupported("singleton_class", value)),
        }
    }

    fn instantiate(&mut self, class: &Value) -> Result<Value, FixtureError> {
        let Some(id) = class.as_object() else {
            return Err(self.unsupported("new", class));
        };
        self.new_instance(id).map(Value::Object)
    }

    fn name_of(&mut self, value: &Value) -> Result<Value, FixtureError> {
        let Some(id) = value.as_object() else {
            return Err(self.unsupported("name", value));
        };
        let entity = self.entity(id)?;
        match entity.kind {
            EntityKind::Class { .. } => Ok(entity
                .name
                .as_deref()
                .map_or(Value::Nil, Value::from)),
            EntityKind::Singleton { .. } => Ok(Value::Nil),
            EntityKind::Instance { .. } => Err(self.unsupported("name", value)),
        }
    }

    fn inspect(&self, value: &Value) -> String {
        match value {
            Value::Object(id) => self.inspect_id(*id),
            Value::Nil | Value::Bool(_) | Value::Int(_) | Value::Str(_) => value.to_string(),
        }
    }
}
