//! Engine configuration options

use serde::{Deserialize, Serialize};
use typevert_ir::Value;

/// Configuration for a mapping function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Return null without building a target when the source is null (default: true)
    pub null_guard: bool,
    /// Which source values count as missing (default: absent or null)
    pub default_policy: DefaultPolicy,
    /// Maximum nesting of converters on one call stack (default: 64)
    pub max_depth: usize,
}

/// Decides when a source field counts as missing
///
/// A missing field receives the rule's default, or is left unset on the
/// target when the rule has none. Anything else is converted and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPolicy {
    /// Absent fields and explicit nulls (default)
    #[default]
    Missing,
    /// Every falsy value: absent, null, `false`, zero, NaN and `""`
    Falsy,
}

impl DefaultPolicy {
    /// Check whether a field read counts as missing under this policy
    #[must_use]
    pub fn is_missing(self, value: Option<&Value>) -> bool {
        match (self, value) {
            (_, None) => true,
            (Self::Missing, Some(value)) => value.is_null(),
            (Self::Falsy, Some(value)) => !value.is_truthy(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            null_guard: true,
            default_policy: DefaultPolicy::Missing,
            max_depth: 64,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the null-source short circuit
    #[must_use]
    pub fn null_guard(mut self, enabled: bool) -> Self {
        self.null_guard = enabled;
        self
    }

    /// Map null sources like any other value
    #[must_use]
    pub fn without_null_guard(mut self) -> Self {
        self.null_guard = false;
        self
    }

    /// Set the missing-value policy
    #[must_use]
    pub fn default_policy(mut self, policy: DefaultPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    /// Set the converter nesting limit
    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
