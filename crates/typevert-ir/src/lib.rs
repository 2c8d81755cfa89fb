#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # typevert-ir
//!
//! Dynamic object model shared by typevert converters.
//!
//! Mapping rules address fields by name, so converters operate on a
//! self-describing [`Value`] tree instead of concrete Rust types. An
//! [`Object`] keeps its own fields in insertion order and distinguishes a
//! field that was never written from one holding [`Value::Null`].
//! [`ObjectType`] describes how a fresh target instance is constructed, and
//! the [`json`] module bridges to `serde` types.

/// Conversions between [`Value`] and `serde` / `serde_json` values.
pub mod json;
/// Target type descriptors used to construct fresh objects.
pub mod object_type;
/// Core value and object model.
pub mod value;

/// Type descriptor for constructing target instances.
pub use object_type::{ObjectType, short_type_name};
/// Value primitives and the object container.
pub use value::{Object, Value};

use thiserror::Error;

/// Errors that can occur when working with the value model
#[derive(Error, Debug)]
pub enum Error {
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Conversion error in {context}: {message}")]
    Conversion { context: String, message: String },
}

impl Error {
    /// Build a type-mismatch error from the expected and actual type labels.
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Build a conversion error with conversion context.
    pub fn conversion(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// Crate-local result type for value model operations.
pub type Result<T> = std::result::Result<T, Error>;
