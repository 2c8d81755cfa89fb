//! Mapping engine
//!
//! A [`MappingFunction`] is built once per converter registration and shared
//! by every converter instance. Each [`apply`](MappingFunction::apply) call
//! constructs a fresh target and walks the rule list in declaration order.

use std::cell::Cell;

use tracing::{debug, trace, warn};
use typevert_ir::{Object, ObjectType, Value};

use crate::config::EngineConfig;
use crate::rule::MappingRule;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Tracks converter nesting on the current thread
struct DepthGuard;

impl DepthGuard {
    fn enter(limit: usize, target_type: &str) -> crate::Result<Self> {
        DEPTH.with(|depth| {
            let next = depth.get() + 1;
            if next > limit {
                return Err(crate::Error::DepthExceeded {
                    limit,
                    target_type: target_type.to_string(),
                });
            }
            depth.set(next);
            Ok(Self)
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Rule-driven transform from a source value to a new target object
#[derive(Debug)]
pub struct MappingFunction {
    name: String,
    source_type: String,
    target_type: ObjectType,
    rules: Vec<MappingRule>,
    config: EngineConfig,
}

impl MappingFunction {
    /// Bind a source type, target type and rule list into a reusable function
    pub fn new(
        source_type: impl Into<String>,
        target_type: ObjectType,
        rules: Vec<MappingRule>,
        config: EngineConfig,
    ) -> Self {
        let source_type = source_type.into();
        Self {
            name: format!("{} -> {}", source_type, target_type.name()),
            source_type,
            target_type,
            rules,
            config,
        }
    }

    /// Rename the function; used by builders that carry a registration name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Name used in logs
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared source type name
    #[must_use]
    pub fn source_type(&self) -> &str {
        &self.source_type
    }

    /// Target type descriptor
    #[must_use]
    pub fn target_type(&self) -> &ObjectType {
        &self.target_type
    }

    /// Rules in application order
    #[must_use]
    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    /// Number of rules
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Engine configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Map a source value onto a fresh target instance.
    ///
    /// Returns `Value::Null` without evaluating any rule when the source is
    /// null and the null guard is enabled.
    ///
    /// # Errors
    ///
    /// Returns the first failure raised by a rule, wrapped with the rule's
    /// description, or [`Error::DepthExceeded`](crate::Error::DepthExceeded)
    /// when nested converters recurse past `max_depth`.
    pub fn apply(&self, source: &Value) -> crate::Result<Value> {
        if self.config.null_guard && source.is_null() {
            trace!(converter = %self.name, "Null source, skipping rules");
            return Ok(Value::Null);
        }

        let _depth = DepthGuard::enter(self.config.max_depth, self.target_type.name())?;
        let mut target = self.target_type.instantiate();

        for rule in &self.rules {
            self.apply_rule(rule, source, &mut target)
                .map_err(|e| crate::Error::rule(rule.describe(), e))?;
        }

        Ok(Value::Object(target))
    }

    fn apply_rule(
        &self,
        rule: &MappingRule,
        source: &Value,
        target: &mut Object,
    ) -> crate::Result<()> {
        let field = source.get_field(&rule.source);

        if self.config.default_policy.is_missing(field) {
            if let Some(default) = &rule.default {
                debug!(
                    converter = %self.name,
                    rule = %rule.describe(),
                    "Source value missing, writing default"
                );
                target.set(rule.target.clone(), default.clone());
            } else {
                trace!(converter = %self.name, rule = %rule.describe(), "Source value missing, leaving target unset");
            }
            return Ok(());
        }

        let Some(value) = field else {
            return Ok(());
        };

        trace!(
            converter = %self.name,
            rule = %rule.describe(),
            conversion = rule.conversion.label(),
            "Applying rule"
        );

        let convert = rule.conversion.bind();
        let converted = match value {
            Value::List(items) if rule.is_collection => Value::List(
                items
                    .iter()
                    .map(|item| convert(item))
                    .collect::<crate::Result<Vec<_>>>()?,
            ),
            _ => {
                if rule.is_collection {
                    warn!(
                        converter = %self.name,
                        rule = %rule.describe(),
                        kind = value.kind(),
                        "Collection rule received a non-list value, converting it directly"
                    );
                }
                convert(value)?
            }
        };

        target.set(rule.target.clone(), converted);
        Ok(())
    }
}
