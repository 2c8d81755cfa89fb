//! # typevert-mapping
//!
//! Declarative object-to-object mapping.
//!
//! A converter is built from a source type name, a target
//! [`ObjectType`](typevert_ir::ObjectType) and an ordered list of
//! [`MappingRule`]s. Each rule copies one source field to one target field,
//! optionally substituting a default for missing input and passing the value
//! through an expression and/or a nested converter. Collections are fanned
//! out element by element.
//!
//! ```
//! use typevert_ir::{Object, ObjectType, Value};
//! use typevert_mapping::{Converter, ConverterBuilder, MappingRule};
//!
//! let converter = ConverterBuilder::new("UserDto", ObjectType::new("User"))
//!     .rule(MappingRule::new("login", "name").expr(|v: &Value| {
//!         Ok(Value::from(v.as_str().unwrap_or_default().to_uppercase()))
//!     }))
//!     .rule(MappingRule::new("age", "age").default(18))
//!     .build();
//!
//! let dto = Value::Object(Object::new().with_field("login", "ada"));
//! let user = converter.convert(dto).unwrap();
//! assert_eq!(user.get_field("name"), Some(&Value::from("ADA")));
//! assert_eq!(user.get_field("age"), Some(&Value::Integer(18)));
//! ```

pub mod builtins;
pub mod config;
pub mod converter;
pub mod dsl;
pub mod engine;
pub mod registry;
pub mod rule;
pub mod typed;

pub use config::{DefaultPolicy, EngineConfig};
pub use converter::{Converter, ConverterBuilder, GeneratedConverter, HookStage};
pub use dsl::{MappingDsl, ParseError, RuleDocument, RuleSpec};
pub use engine::MappingFunction;
pub use registry::Registry;
pub use rule::{Conversion, ConverterRef, Expr, MappingRule};
pub use typed::TypedConverter;

use thiserror::Error;

/// Errors that can occur during mapping
#[derive(Error, Debug)]
pub enum Error {
    /// Raised by expressions that cannot handle their input
    #[error("Transform error: {0}")]
    Transform(String),

    /// A rule failed; wraps whatever its expression or converter raised
    #[error("Rule '{rule}' failed: {source}")]
    Rule {
        rule: String,
        #[source]
        source: Box<Error>,
    },

    #[error("{stage} hook rejected value: {message}")]
    Hook { stage: HookStage, message: String },

    #[error("Converter nesting exceeded depth {limit} while building '{target_type}'")]
    DepthExceeded { limit: usize, target_type: String },

    #[error("DSL parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Unknown {kind} '{name}'")]
    Unresolved { kind: &'static str, name: String },

    #[error("Value error: {0}")]
    Value(#[from] typevert_ir::Error),
}

impl Error {
    /// Create a transform error
    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform(message.into())
    }

    /// Create a hook rejection error
    pub fn hook(stage: HookStage, message: impl Into<String>) -> Self {
        Self::Hook {
            stage,
            message: message.into(),
        }
    }

    /// Wrap an error raised while applying a rule
    pub fn rule(rule: impl Into<String>, source: Error) -> Self {
        Self::Rule {
            rule: rule.into(),
            source: Box::new(source),
        }
    }

    /// Create an unresolved-name error
    pub fn unresolved(kind: &'static str, name: impl Into<String>) -> Self {
        Self::Unresolved {
            kind,
            name: name.into(),
        }
    }

    /// Innermost error, looking through nested rule failures
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Self::Rule { source, .. } = current {
            current = source;
        }
        current
    }

    /// Rule descriptions from the outermost converter inwards
    #[must_use]
    pub fn rule_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let Self::Rule { rule, source } = current {
            path.push(rule.as_str());
            current = source;
        }
        path
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_and_rule_path() {
        let err = Error::rule(
            "lines -> items",
            Error::rule("qty -> quantity", Error::transform("not a number")),
        );

        assert!(matches!(err.root_cause(), Error::Transform(_)));
        assert_eq!(err.rule_path(), vec!["lines -> items", "qty -> quantity"]);
        assert!(err.to_string().contains("Rule 'lines -> items' failed"));
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_hook_error_display() {
        let err = Error::hook(HookStage::Pre, "missing id");
        assert_eq!(err.to_string(), "pre-convert hook rejected value: missing id");
    }
}
