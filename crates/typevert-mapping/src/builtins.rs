//! Built-in expressions
//!
//! Registered by [`Registry::with_builtins`](crate::Registry::with_builtins).
//! Every built-in passes `Null` through unchanged.

use typevert_ir::Value;

use crate::registry::Registry;

/// Register every built-in under its short name
pub fn install(registry: &mut Registry) {
    registry
        .register_expression("uppercase", uppercase)
        .register_expression("lowercase", lowercase)
        .register_expression("trim", trim)
        .register_expression("to_string", to_string)
        .register_expression("to_integer", to_integer)
        .register_expression("to_decimal", to_decimal)
        .register_expression("length", length)
        .register_expression("not", not);
}

fn map_text(value: &Value, op: &str, f: impl Fn(&str) -> String) -> crate::Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(f(s))),
        Value::Null => Ok(Value::Null),
        _ => value
            .as_string()
            .map(|s| Value::String(f(&s)))
            .ok_or_else(|| crate::Error::transform(format!("Cannot {op} a {}", value.kind()))),
    }
}

/// Convert string to uppercase
///
/// # Errors
///
/// Returns an error for lists and objects.
pub fn uppercase(value: &Value) -> crate::Result<Value> {
    map_text(value, "uppercase", str::to_uppercase)
}

/// Convert string to lowercase
///
/// # Errors
///
/// Returns an error for lists and objects.
pub fn lowercase(value: &Value) -> crate::Result<Value> {
    map_text(value, "lowercase", str::to_lowercase)
}

/// Trim surrounding whitespace
///
/// # Errors
///
/// Returns an error for lists and objects.
pub fn trim(value: &Value) -> crate::Result<Value> {
    map_text(value, "trim", |s| s.trim().to_string())
}

/// Render a scalar as a string
///
/// # Errors
///
/// Returns an error for lists and objects.
pub fn to_string(value: &Value) -> crate::Result<Value> {
    map_text(value, "stringify", str::to_string)
}

/// 2^63; `i64::MAX as f64` rounds up to this
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Parse or narrow to an integer; decimals are truncated toward zero
///
/// # Errors
///
/// Returns an error when a string does not parse, a decimal is not finite
/// or falls outside the `i64` range, or the value is a list or object.
#[allow(clippy::cast_possible_truncation)] // Range is checked first, so the cast is exact.
pub fn to_integer(value: &Value) -> crate::Result<Value> {
    match value {
        Value::Null | Value::Integer(_) => Ok(value.clone()),
        Value::Boolean(b) => Ok(Value::Integer(i64::from(*b))),
        Value::Decimal(d) if (-I64_BOUND..I64_BOUND).contains(&d.trunc()) => {
            Ok(Value::Integer(d.trunc() as i64))
        }
        Value::Decimal(d) => Err(crate::Error::transform(format!(
            "Cannot convert {d} to integer"
        ))),
        Value::String(s) => s.trim().parse::<i64>().map(Value::Integer).map_err(|_| {
            crate::Error::transform(format!("Cannot parse '{s}' as integer"))
        }),
        Value::List(_) | Value::Object(_) => Err(crate::Error::transform(format!(
            "Cannot convert a {} to integer",
            value.kind()
        ))),
    }
}

/// Parse or widen to a decimal
///
/// # Errors
///
/// Returns an error when a string does not parse or the value is not a
/// scalar number or string.
pub fn to_decimal(value: &Value) -> crate::Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Integer(_) | Value::Decimal(_) => {
            Ok(value.as_f64().map_or(Value::Null, Value::Decimal))
        }
        Value::String(s) => s.trim().parse::<f64>().map(Value::Decimal).map_err(|_| {
            crate::Error::transform(format!("Cannot parse '{s}' as decimal"))
        }),
        Value::Boolean(_) | Value::List(_) | Value::Object(_) => Err(crate::Error::transform(
            format!("Cannot convert a {} to decimal", value.kind()),
        )),
    }
}

/// Character count of a string, element count of a list, field count of an object
///
/// # Errors
///
/// Returns an error for booleans and numbers.
pub fn length(value: &Value) -> crate::Result<Value> {
    let len = match value {
        Value::Null => return Ok(Value::Null),
        Value::String(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Object(object) => object.len(),
        Value::Boolean(_) | Value::Integer(_) | Value::Decimal(_) => {
            return Err(crate::Error::transform(format!(
                "Cannot take the length of a {}",
                value.kind()
            )));
        }
    };
    i64::try_from(len)
        .map(Value::Integer)
        .map_err(|_| crate::Error::transform("Length exceeds integer range"))
}

/// Negated truthiness
///
/// # Errors
///
/// Never fails; returns `Result` to match the expression signature.
#[allow(clippy::unnecessary_wraps)] // Registered as an expression, which must return Result.
pub fn not(value: &Value) -> crate::Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        _ => Ok(Value::Boolean(!value.is_truthy())),
    }
}
