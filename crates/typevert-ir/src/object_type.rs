//! Type descriptors for constructing fresh objects
#![allow(clippy::must_use_candidate)] // Builder/constructor API intentionally omits pervasive #[must_use].
#![allow(clippy::return_self_not_must_use)] // Fluent builder methods return Self for ergonomics.

use indexmap::IndexMap;
use serde::Serialize;

use crate::json::to_value;
use crate::value::{Object, Value};
use crate::{Error, Result};

/// Describes a type that converters can instantiate
///
/// Every call to [`ObjectType::instantiate`] produces a new object tagged with
/// the type name and carrying a copy of the declared field defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectType {
    name: String,
    defaults: IndexMap<String, Value>,
}

impl ObjectType {
    /// Create a type with no predeclared fields
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defaults: IndexMap::new(),
        }
    }

    /// Declare a field initialized on every new instance
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    /// Derive a type from `T::default()`.
    ///
    /// The type name is the last path segment of the Rust type name and the
    /// field defaults are the serialized fields of the default value.
    ///
    /// # Errors
    ///
    /// Returns an error if `T` does not serialize to an object.
    pub fn from_default<T: Default + Serialize>() -> Result<Self> {
        let value = to_value(&T::default())?;
        match value {
            Value::Object(object) => Ok(Self {
                name: short_type_name::<T>().to_string(),
                defaults: object.into_fields(),
            }),
            other => Err(Error::type_mismatch("object", other.kind())),
        }
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Predeclared fields and their initial values
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.defaults.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Construct a fresh instance
    pub fn instantiate(&self) -> Object {
        self.defaults
            .iter()
            .fold(Object::typed(&self.name), |object, (name, value)| {
                object.with_field(name.clone(), value.clone())
            })
    }
}

/// Last path segment of a Rust type name, without generic arguments
///
/// `my::Wrap<other::Inner>` becomes `Wrap`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
