//! Rule documents
//!
//! Declarative YAML form of a converter registration. Expressions and nested
//! converters are referred to by name and resolved through a
//! [`Registry`](crate::Registry).

use serde::{Deserialize, Serialize};
use typevert_ir::Value;

use crate::config::EngineConfig;

/// A complete converter registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleDocument {
    /// Converter name, also the name other documents use to reference it
    pub name: String,

    /// Source type name
    pub source_type: String,

    /// Target type name; resolved against registered object types
    pub target_type: String,

    /// Engine options
    #[serde(default)]
    pub options: EngineConfig,

    /// Field rules in application order
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// A rule as written in a document
///
/// Recognized keys are exactly `source`, `target`, `default`,
/// `is_collection`, `expr` and `converter`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_collection: bool,
    /// Registered expression name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    /// Registered converter name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter: Option<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if passes a reference.
fn is_false(value: &bool) -> bool {
    !*value
}

/// DSL Parser
pub struct MappingDsl;

/// Parse error type
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let (Some(line), Some(col)) = (self.line, self.column) {
            write!(f, " at line {line}, column {col}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl MappingDsl {
    /// Parse a rule document from YAML
    ///
    /// # Errors
    ///
    /// Returns an error when YAML parsing fails or the document uses unknown keys.
    pub fn parse(yaml: &str) -> Result<RuleDocument, ParseError> {
        serde_yaml::from_str(yaml).map_err(|e| ParseError {
            message: format!("Failed to parse rule document: {e}"),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
        })
    }

    /// Parse a rule document from a file
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn parse_file(path: &std::path::Path) -> Result<RuleDocument, ParseError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParseError {
            message: format!("Failed to read {}: {e}", path.display()),
            line: None,
            column: None,
        })?;
        Self::parse(&content)
    }

    /// Serialize a rule document to YAML
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn to_yaml(document: &RuleDocument) -> Result<String, ParseError> {
        serde_yaml::to_string(document).map_err(|e| ParseError {
            message: format!("Failed to serialize: {e}"),
            line: None,
            column: None,
        })
    }
}
