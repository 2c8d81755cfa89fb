//! Bridge between [`Value`] and `serde`
//!
//! `serde_json::Value` is the interchange format: typed Rust values are
//! serialized into it and then lifted into the dynamic model, and the reverse
//! on the way out. Field order survives in both directions; object type
//! names do not survive the trip to JSON.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::value::{Object, Value};
use crate::{Error, Result};

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => number_to_value(&n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(name, field)| (name, Value::from(field)))
                    .collect::<Object>(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => serde_json::Value::Number(i.into()),
            // NaN and infinities have no JSON representation
            Value::Decimal(d) => serde_json::Number::from_f64(d)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Object(object) => serde_json::Value::Object(
                object
                    .into_fields()
                    .into_iter()
                    .map(|(name, field)| (name, field.into()))
                    .collect(),
            ),
        }
    }
}

#[allow(clippy::cast_precision_loss)] // u64 beyond i64::MAX only fits a float.
fn number_to_value(number: &serde_json::Number) -> Value {
    if let Some(i) = number.as_i64() {
        Value::Integer(i)
    } else if let Some(u) = number.as_u64() {
        Value::Decimal(u as f64)
    } else {
        Value::Decimal(number.as_f64().unwrap_or(f64::NAN))
    }
}

/// Serialize any `serde` value into the dynamic model
///
/// # Errors
///
/// Returns an error when the value cannot be serialized.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map(Value::from)
        .map_err(|e| Error::conversion(std::any::type_name::<T>(), e.to_string()))
}

/// Deserialize a typed value out of the dynamic model
///
/// # Errors
///
/// Returns an error when the value does not match the shape of `T`.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value.into())
        .map_err(|e| Error::conversion(std::any::type_name::<T>(), e.to_string()))
}

/// Parse JSON text into the dynamic model
///
/// # Errors
///
/// Returns an error when the text is not valid JSON.
pub fn parse_str(text: &str) -> Result<Value> {
    serde_json::from_str::<serde_json::Value>(text)
        .map(Value::from)
        .map_err(|e| Error::conversion("json", e.to_string()))
}

/// Render a value as pretty-printed JSON
///
/// # Errors
///
/// Returns an error when serialization fails.
pub fn to_string_pretty(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(&serde_json::Value::from(value.clone()))
        .map_err(|e| Error::conversion("json", e.to_string()))
}
