//! Value and object types for the dynamic model
#![allow(clippy::must_use_candidate)] // Accessor API intentionally omits pervasive #[must_use].
#![allow(clippy::return_self_not_must_use)] // Fluent builder methods return Self for ergonomics.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Values that can be read from a source or written to a target
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    /// Null value
    #[default]
    Null,

    /// Boolean value
    Boolean(bool),

    /// Integer value
    Integer(i64),

    /// Decimal value
    Decimal(f64),

    /// String value
    String(String),

    /// Ordered sequence
    List(Vec<Value>),

    /// Object with named fields
    Object(Object),
}

/// An object instance: an optional type name plus its own fields
///
/// Fields keep insertion order. A field that was never written is not
/// present at all, which callers can observe through [`Object::contains`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object {
    type_name: Option<String>,
    fields: IndexMap<String, Value>,
}

impl Object {
    /// Create an untyped, empty object
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty object tagged with a type name
    pub fn typed(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            fields: IndexMap::new(),
        }
    }

    /// Add a field, builder style
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Type name, if the object was constructed from a type descriptor
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Check whether the object was constructed as the named type
    pub fn is_instance_of(&self, type_name: &str) -> bool {
        self.type_name.as_deref() == Some(type_name)
    }

    /// Get an own field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get an own field mutably
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Write a field, replacing any previous value in place
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    /// Remove a field, preserving the order of the remaining fields
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    /// Check whether the field is an own field of this object
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of own fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the object has no own fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field names in insertion order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Consume the object, returning its fields
    pub fn into_fields(self) -> IndexMap<String, Value> {
        self.fields
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            type_name: None,
            fields: iter.into_iter().collect(),
        }
    }
}

impl Value {
    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Loose truthiness: null, `false`, zero, NaN and the empty string are
    /// falsy; every list and object is truthy, including empty ones.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Decimal(d) => *d != 0.0 && !d.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::List(_) | Value::Object(_) => true,
        }
    }

    /// Read a named field.
    ///
    /// Only objects have fields; every other value reads as absent.
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(object) => object.get(name),
            _ => None,
        }
    }

    /// Borrow as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Render a scalar value as a string
    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Decimal(d) => Some(d.to_string()),
            Value::Boolean(b) => Some(b.to_string()),
            Value::List(_) | Value::Object(_) | Value::Null => None,
        }
    }

    /// Get as integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as floating point, widening integers
    #[allow(clippy::cast_precision_loss)] // Large integers lose precision, same as JSON numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow as a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as an object
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Borrow as a mutable object
    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Short label of the value kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Decimal(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(!Value::Decimal(0.0).is_truthy());
        assert!(!Value::Decimal(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());

        assert!(Value::Integer(-1).is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::List(Vec::new()).is_truthy());
        assert!(Value::Object(Object::new()).is_truthy());
    }

    #[test]
    fn test_object_own_fields() {
        let mut object = Object::typed("Order").with_field("id", 7);
        object.set("note", Value::Null);

        assert!(object.is_instance_of("Order"));
        assert!(object.contains("note"));
        assert!(!object.contains("missing"));
        assert_eq!(object.get("id"), Some(&Value::Integer(7)));
        assert_eq!(object.len(), 2);
    }

    #[test]
    fn test_object_keeps_insertion_order() {
        let mut object = Object::new()
            .with_field("c", 3)
            .with_field("a", 1)
            .with_field("b", 2);
        object.remove("a");
        object.set("c", Value::Integer(30));

        let names: Vec<&str> = object.field_names().collect();
        assert_eq!(names, vec!["c", "b"]);
    }

    #[test]
    fn test_get_field_on_non_object_is_absent() {
        assert!(Value::from("text").get_field("len").is_none());
        assert!(Value::Null.get_field("anything").is_none());

        let value = Value::Object(Object::new().with_field("a", 1));
        assert_eq!(value.get_field("a"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_as_string_renders_scalars() {
        assert_eq!(Value::Integer(42).as_string().as_deref(), Some("42"));
        assert_eq!(Value::Boolean(true).as_string().as_deref(), Some("true"));
        assert_eq!(Value::List(Vec::new()).as_string(), None);
        assert_eq!(Value::Null.as_string(), None);
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(vec![1, 2]), Value::List(vec![Value::Integer(1), Value::Integer(2)]));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".to_string()));
        assert_eq!(Value::from(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::Integer(2).as_f64(), Some(2.0));
    }
}
