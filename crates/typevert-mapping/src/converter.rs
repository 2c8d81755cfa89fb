//! Converter lifecycle
//!
//! Every conversion runs the same three steps: [`Converter::pre_convert`],
//! the rule-driven [`Converter::transform`], then [`Converter::post_convert`].
//! The hooks default to identity. Override them by implementing the trait on
//! your own type, or pass closures to [`ConverterBuilder`].

use std::fmt;
use std::sync::Arc;

use tracing::debug;
use typevert_ir::{ObjectType, Value};

use crate::config::EngineConfig;
use crate::engine::MappingFunction;
use crate::rule::MappingRule;

/// Lifecycle hook over a whole value
pub type Hook = Arc<dyn Fn(Value) -> crate::Result<Value> + Send + Sync>;

/// Lifecycle stage, reported when a hook rejects a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    Pre,
    Post,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pre => write!(f, "pre-convert"),
            Self::Post => write!(f, "post-convert"),
        }
    }
}

/// A unit exposing `convert(source) -> target`
///
/// Implementors supply [`transform`](Converter::transform), usually by
/// delegating to a shared [`MappingFunction`], and may override the hooks:
///
/// ```
/// use std::sync::Arc;
/// use typevert_ir::{Object, ObjectType, Value};
/// use typevert_mapping::{Converter, EngineConfig, MappingFunction, MappingRule};
///
/// struct StampedUser {
///     mapping: Arc<MappingFunction>,
/// }
///
/// impl Converter for StampedUser {
///     fn name(&self) -> &str {
///         "stamped_user"
///     }
///
///     fn transform(&self, source: &Value) -> typevert_mapping::Result<Value> {
///         self.mapping.apply(source)
///     }
///
///     fn post_convert(&self, mut target: Value) -> typevert_mapping::Result<Value> {
///         if let Some(object) = target.as_object_mut() {
///             object.set("stamped", Value::Boolean(true));
///         }
///         Ok(target)
///     }
/// }
///
/// let mapping = MappingFunction::new(
///     "UserDto",
///     ObjectType::new("User"),
///     vec![MappingRule::new("id", "id")],
///     EngineConfig::default(),
/// );
/// let converter = StampedUser { mapping: Arc::new(mapping) };
///
/// let user = converter
///     .convert(Value::Object(Object::new().with_field("id", 7)))
///     .unwrap();
/// assert_eq!(user.get_field("stamped"), Some(&Value::Boolean(true)));
/// ```
pub trait Converter: Send + Sync {
    /// Identifies the converter in logs
    fn name(&self) -> &str;

    /// Build the target from an already pre-converted source
    ///
    /// # Errors
    ///
    /// Returns an error when a rule's expression or nested converter fails.
    fn transform(&self, source: &Value) -> crate::Result<Value>;

    /// Runs before the transform; identity by default
    ///
    /// # Errors
    ///
    /// Implementations may reject the source.
    fn pre_convert(&self, source: Value) -> crate::Result<Value> {
        Ok(source)
    }

    /// Runs after the transform; identity by default
    ///
    /// # Errors
    ///
    /// Implementations may reject the target.
    fn post_convert(&self, target: Value) -> crate::Result<Value> {
        Ok(target)
    }

    /// Run the full lifecycle
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a hook or by the transform; no
    /// partial target is returned.
    fn convert(&self, source: Value) -> crate::Result<Value> {
        let source = self.pre_convert(source)?;
        let target = self.transform(&source)?;
        self.post_convert(target)
    }
}

/// Converter produced by [`ConverterBuilder`]
///
/// Clones share the mapping function and hooks, so constructing an instance
/// per call is cheap.
#[derive(Clone)]
pub struct GeneratedConverter {
    mapping: Arc<MappingFunction>,
    pre: Option<Hook>,
    post: Option<Hook>,
}

impl GeneratedConverter {
    /// Shared mapping function
    #[must_use]
    pub fn mapping(&self) -> &Arc<MappingFunction> {
        &self.mapping
    }
}

impl Converter for GeneratedConverter {
    fn name(&self) -> &str {
        self.mapping.name()
    }

    fn transform(&self, source: &Value) -> crate::Result<Value> {
        self.mapping.apply(source)
    }

    fn pre_convert(&self, source: Value) -> crate::Result<Value> {
        match &self.pre {
            Some(hook) => hook(source),
            None => Ok(source),
        }
    }

    fn post_convert(&self, target: Value) -> crate::Result<Value> {
        match &self.post {
            Some(hook) => hook(target),
            None => Ok(target),
        }
    }
}

impl fmt::Debug for GeneratedConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedConverter")
            .field("mapping", &self.mapping)
            .field("has_pre", &self.pre.is_some())
            .field("has_post", &self.post.is_some())
            .finish()
    }
}

/// Registers rules and hooks for a source/target pair
pub struct ConverterBuilder {
    name: Option<String>,
    source_type: String,
    target_type: ObjectType,
    rules: Vec<MappingRule>,
    config: EngineConfig,
    pre: Option<Hook>,
    post: Option<Hook>,
}

impl ConverterBuilder {
    /// Start a converter from `source_type` into new instances of `target_type`
    pub fn new(source_type: impl Into<String>, target_type: ObjectType) -> Self {
        Self {
            name: None,
            source_type: source_type.into(),
            target_type,
            rules: Vec::new(),
            config: EngineConfig::default(),
            pre: None,
            post: None,
        }
    }

    /// Set the converter name (default: `"<source> -> <target>"`)
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a rule
    #[must_use]
    pub fn rule(mut self, rule: MappingRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append several rules in order
    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = MappingRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Set the engine configuration
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the pre-convert hook
    #[must_use]
    pub fn pre_convert(
        mut self,
        hook: impl Fn(Value) -> crate::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.pre = Some(Arc::new(hook));
        self
    }

    /// Set the post-convert hook
    #[must_use]
    pub fn post_convert(
        mut self,
        hook: impl Fn(Value) -> crate::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.post = Some(Arc::new(hook));
        self
    }

    /// Compile the rules and produce the converter
    #[must_use]
    pub fn build(self) -> GeneratedConverter {
        let name = self
            .name
            .unwrap_or_else(|| format!("{} -> {}", self.source_type, self.target_type.name()));
        let mapping = MappingFunction::new(
            self.source_type,
            self.target_type,
            self.rules,
            self.config,
        )
        .with_name(name);

        debug!(
            converter = mapping.name(),
            rules = mapping.rule_count(),
            "Converter built"
        );

        GeneratedConverter {
            mapping: Arc::new(mapping),
            pre: self.pre,
            post: self.post,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use typevert_ir::Object;

    fn source() -> Value {
        Value::Object(Object::new().with_field("id", 1))
    }

    #[test]
    fn test_default_name() {
        let converter = ConverterBuilder::new("A", ObjectType::new("B")).build();
        assert_eq!(converter.name(), "A -> B");

        let named = ConverterBuilder::new("A", ObjectType::new("B"))
            .name("a_to_b")
            .build();
        assert_eq!(named.name(), "a_to_b");
    }

    #[test]
    fn test_lifecycle_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (pre_calls, expr_calls, post_calls) =
            (Arc::clone(&calls), Arc::clone(&calls), Arc::clone(&calls));

        let converter = ConverterBuilder::new("A", ObjectType::new("B"))
            .rule(MappingRule::new("id", "id").expr(move |v| {
                expr_calls.lock().unwrap().push("transform");
                Ok(v.clone())
            }))
            .pre_convert(move |v| {
                pre_calls.lock().unwrap().push("pre");
                Ok(v)
            })
            .post_convert(move |v| {
                post_calls.lock().unwrap().push("post");
                Ok(v)
            })
            .build();

        converter.convert(source()).unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["pre", "transform", "post"]);
    }

    #[test]
    fn test_pre_hook_rewrites_source() {
        let converter = ConverterBuilder::new("A", ObjectType::new("B"))
            .rule(MappingRule::new("id", "id"))
            .pre_convert(|_| Ok(Value::Object(Object::new().with_field("id", 99))))
            .build();

        let target = converter.convert(source()).unwrap();
        assert_eq!(target.get_field("id"), Some(&Value::Integer(99)));
    }

    #[test]
    fn test_pre_hook_rejection_skips_transform() {
        let converter = ConverterBuilder::new("A", ObjectType::new("B"))
            .rule(MappingRule::new("id", "id").expr(|_| panic!("transform must not run")))
            .pre_convert(|_| Err(crate::Error::hook(HookStage::Pre, "rejected")))
            .build();

        let err = converter.convert(source()).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Hook {
                stage: HookStage::Pre,
                ..
            }
        ));
    }

    #[test]
    fn test_post_hook_sees_null_from_guard() {
        let converter = ConverterBuilder::new("A", ObjectType::new("B"))
            .post_convert(|v| {
                assert!(v.is_null());
                Ok(v)
            })
            .build();

        assert!(converter.convert(Value::Null).unwrap().is_null());
    }

    #[test]
    fn test_clones_share_mapping() {
        let converter = ConverterBuilder::new("A", ObjectType::new("B")).build();
        let clone = converter.clone();
        assert!(Arc::ptr_eq(converter.mapping(), clone.mapping()));
    }
}
