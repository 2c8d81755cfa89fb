//! Typed front end for converters
//!
//! Wraps a [`Converter`] so callers hand in and get back their own `serde`
//! types. Values travel through the dynamic model in between.

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use typevert_ir::{Value, json};

use crate::converter::{Converter, GeneratedConverter};

/// Converter from `S` to `T`
///
/// `None` plays the role of a null source: with the null guard enabled it
/// converts to `None` without running any rule.
pub struct TypedConverter<S, T, C = GeneratedConverter> {
    inner: C,
    _types: PhantomData<fn(&S) -> T>,
}

impl<S, T, C> TypedConverter<S, T, C>
where
    S: Serialize,
    T: DeserializeOwned,
    C: Converter,
{
    /// Wrap a converter
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            _types: PhantomData,
        }
    }

    /// Underlying dynamic converter
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Convert a typed source
    ///
    /// # Errors
    ///
    /// Returns an error when the source cannot be serialized, conversion
    /// fails, or the result does not deserialize into `T`.
    pub fn convert(&self, source: Option<&S>) -> crate::Result<Option<T>> {
        let source = match source {
            Some(source) => json::to_value(source)?,
            None => Value::Null,
        };

        let target = self.inner.convert(source)?;
        if target.is_null() {
            return Ok(None);
        }
        Ok(Some(json::from_value(target)?))
    }

    /// Convert every element of a slice, preserving order
    ///
    /// # Errors
    ///
    /// Returns the first failure; no partial output is returned.
    pub fn convert_all(&self, sources: &[S]) -> crate::Result<Vec<Option<T>>> {
        sources
            .iter()
            .map(|source| self.convert(Some(source)))
            .collect()
    }
}

impl<S, T, C: Clone> Clone for TypedConverter<S, T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _types: PhantomData,
        }
    }
}

impl<S, T, C: Converter> fmt::Debug for TypedConverter<S, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedConverter")
            .field("converter", &self.inner.name())
            .field("source", &std::any::type_name::<S>())
            .field("target", &std::any::type_name::<T>())
            .finish()
    }
}
