//! Named expressions, converters and object types
//!
//! A [`Registry`] resolves the names used in [`RuleDocument`]s. Documents
//! are built into converters once; after that the registry is only read.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};
use typevert_ir::{ObjectType, Value};

use crate::builtins;
use crate::converter::{ConverterBuilder, GeneratedConverter};
use crate::dsl::{MappingDsl, RuleDocument, RuleSpec};
use crate::rule::{ConverterRef, Expr, MappingRule};

/// Registry of everything a rule document can refer to by name
#[derive(Clone, Default)]
pub struct Registry {
    expressions: HashMap<String, Expr>,
    converters: HashMap<String, ConverterRef>,
    types: HashMap<String, ObjectType>,
}

impl Registry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry preloaded with the built-in expressions
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::install(&mut registry);
        registry
    }

    /// Register an expression
    pub fn register_expression(
        &mut self,
        name: impl Into<String>,
        expr: impl Fn(&Value) -> crate::Result<Value> + Send + Sync + 'static,
    ) -> &mut Self {
        self.expressions.insert(name.into(), Arc::new(expr));
        self
    }

    /// Register a converter under a name
    pub fn register_converter(
        &mut self,
        name: impl Into<String>,
        converter: ConverterRef,
    ) -> &mut Self {
        self.converters.insert(name.into(), converter);
        self
    }

    /// Register an object type under its own name
    pub fn register_type(&mut self, object_type: ObjectType) -> &mut Self {
        self.types
            .insert(object_type.name().to_string(), object_type);
        self
    }

    /// Get an expression by name
    #[must_use]
    pub fn expression(&self, name: &str) -> Option<Expr> {
        self.expressions.get(name).cloned()
    }

    /// Get a converter by name
    #[must_use]
    pub fn converter(&self, name: &str) -> Option<ConverterRef> {
        self.converters.get(name).cloned()
    }

    /// Resolve a type name; unregistered names yield a type with no fields
    #[must_use]
    pub fn object_type(&self, name: &str) -> ObjectType {
        self.types
            .get(name)
            .cloned()
            .unwrap_or_else(|| ObjectType::new(name))
    }

    /// Check if an expression exists
    #[must_use]
    pub fn has_expression(&self, name: &str) -> bool {
        self.expressions.contains_key(name)
    }

    /// Check if a converter exists
    #[must_use]
    pub fn has_converter(&self, name: &str) -> bool {
        self.converters.contains_key(name)
    }

    /// Registered converter names, sorted
    #[must_use]
    pub fn converter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.converters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered expression names, sorted
    #[must_use]
    pub fn expression_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.expressions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Build a converter from a rule document
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unresolved`](crate::Error::Unresolved) when a rule
    /// names an expression or converter that is not registered.
    pub fn build_converter(&self, document: &RuleDocument) -> crate::Result<GeneratedConverter> {
        let rules = document
            .rules
            .iter()
            .map(|spec| self.resolve_rule(spec))
            .collect::<crate::Result<Vec<_>>>()?;

        Ok(ConverterBuilder::new(
            document.source_type.clone(),
            self.object_type(&document.target_type),
        )
        .name(document.name.clone())
        .config(document.options)
        .rules(rules)
        .build())
    }

    fn resolve_rule(&self, spec: &RuleSpec) -> crate::Result<MappingRule> {
        let mut rule = MappingRule::new(spec.source.clone(), spec.target.clone());
        rule.default.clone_from(&spec.default);
        rule.is_collection = spec.is_collection;

        if let Some(name) = &spec.expr {
            let expr = self
                .expression(name)
                .ok_or_else(|| crate::Error::unresolved("expression", name))?;
            rule = rule.shared_expr(expr);
        }
        if let Some(name) = &spec.converter {
            let converter = self
                .converter(name)
                .ok_or_else(|| crate::Error::unresolved("converter", name))?;
            rule = rule.converter(converter);
        }

        Ok(rule)
    }

    /// Parse a rule document, build it and register the converter under the
    /// document name
    ///
    /// # Errors
    ///
    /// Returns an error when parsing or name resolution fails.
    pub fn load(&mut self, yaml: &str) -> crate::Result<GeneratedConverter> {
        let document = MappingDsl::parse(yaml)?;
        self.install(&document)
    }

    /// Load a rule document from a file
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, parsed or resolved.
    pub fn load_file(&mut self, path: &Path) -> crate::Result<GeneratedConverter> {
        let document = MappingDsl::parse_file(path)?;
        info!(path = %path.display(), converter = %document.name, "Loaded rule document");
        self.install(&document)
    }

    fn install(&mut self, document: &RuleDocument) -> crate::Result<GeneratedConverter> {
        let converter = self.build_converter(document)?;
        if self.has_converter(&document.name) {
            debug!(converter = %document.name, "Replacing registered converter");
        }
        self.register_converter(
            document.name.clone(),
            ConverterRef::from_converter(converter.clone()),
        );
        Ok(converter)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("expressions", &self.expression_names())
            .field("converters", &self.converter_names())
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish()
    }
}
