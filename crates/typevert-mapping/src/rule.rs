//! Mapping rule model
//!
//! A [`MappingRule`] names one source field and one target field. How the
//! value travels between them is the rule's [`Conversion`], a closed variant
//! fixed when the rule is built rather than discovered per call.

use std::fmt;
use std::sync::Arc;

use typevert_ir::{Value, short_type_name};

use crate::converter::Converter;

/// Pure function from one source field value to an intermediate value
pub type Expr = Arc<dyn Fn(&Value) -> crate::Result<Value> + Send + Sync>;

/// Per-call conversion function produced from a [`Conversion`]
pub(crate) type ConversionFn = Box<dyn Fn(&Value) -> crate::Result<Value>>;

/// Reference to a converter used for nested values
///
/// Holds a factory rather than an instance: every mapping call constructs its
/// own converter, so nested conversions never share state.
#[derive(Clone)]
pub struct ConverterRef {
    name: String,
    factory: Arc<dyn Fn() -> Box<dyn Converter> + Send + Sync>,
}

impl ConverterRef {
    /// Create a reference from a named factory
    pub fn new(
        name: impl Into<String>,
        factory: impl Fn() -> Box<dyn Converter> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    /// Reference a converter type constructed through `Default`
    #[must_use]
    pub fn of<C: Converter + Default + 'static>() -> Self {
        Self::new(short_type_name::<C>(), || Box::new(C::default()))
    }

    /// Reference a converter value; each instantiation is a fresh clone
    pub fn from_converter<C: Converter + Clone + 'static>(converter: C) -> Self {
        let name = converter.name().to_string();
        Self::new(name, move || Box::new(converter.clone()))
    }

    /// Converter name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Construct a fresh converter instance
    #[must_use]
    pub fn instantiate(&self) -> Box<dyn Converter> {
        (self.factory)()
    }
}

impl fmt::Debug for ConverterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRef")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// How a value is converted on its way to the target field
#[derive(Clone, Default)]
pub enum Conversion {
    /// Identity passthrough
    #[default]
    Plain,
    /// Apply an expression
    WithExpr(Expr),
    /// Run a nested converter
    WithConverter(ConverterRef),
    /// Apply the expression, then feed its result to the converter
    WithBoth { expr: Expr, converter: ConverterRef },
}

impl Conversion {
    /// Add or replace the expression step
    #[must_use]
    pub fn with_expr(self, expr: Expr) -> Self {
        match self {
            Self::Plain | Self::WithExpr(_) => Self::WithExpr(expr),
            Self::WithConverter(converter) | Self::WithBoth { converter, .. } => {
                Self::WithBoth { expr, converter }
            }
        }
    }

    /// Add or replace the converter step
    #[must_use]
    pub fn with_converter(self, converter: ConverterRef) -> Self {
        match self {
            Self::Plain | Self::WithConverter(_) => Self::WithConverter(converter),
            Self::WithExpr(expr) | Self::WithBoth { expr, .. } => {
                Self::WithBoth { expr, converter }
            }
        }
    }

    /// Short label of the variant
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::WithExpr(_) => "expr",
            Self::WithConverter(_) => "converter",
            Self::WithBoth { .. } => "expr+converter",
        }
    }

    /// Nested converter, if any
    #[must_use]
    pub fn converter(&self) -> Option<&ConverterRef> {
        match self {
            Self::WithConverter(converter) | Self::WithBoth { converter, .. } => Some(converter),
            Self::Plain | Self::WithExpr(_) => None,
        }
    }

    /// Bind the conversion for one mapping call.
    ///
    /// A nested converter is instantiated here, once, and shared by every
    /// element when the rule fans out over a collection.
    pub(crate) fn bind(&self) -> ConversionFn {
        match self {
            Self::Plain => Box::new(|value: &Value| Ok(value.clone())),
            Self::WithExpr(expr) => {
                let expr = Arc::clone(expr);
                Box::new(move |value: &Value| expr(value))
            }
            Self::WithConverter(converter) => {
                let converter = converter.instantiate();
                Box::new(move |value: &Value| converter.convert(value.clone()))
            }
            Self::WithBoth { expr, converter } => {
                let expr = Arc::clone(expr);
                let converter = converter.instantiate();
                Box::new(move |value: &Value| converter.convert(expr(value)?))
            }
        }
    }
}

impl fmt::Debug for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("Plain"),
            Self::WithExpr(_) => f.write_str("WithExpr(..)"),
            Self::WithConverter(converter) => {
                f.debug_tuple("WithConverter").field(converter).finish()
            }
            Self::WithBoth { converter, .. } => f
                .debug_struct("WithBoth")
                .field("converter", converter)
                .finish_non_exhaustive(),
        }
    }
}

/// Individual mapping rule
#[derive(Debug, Clone)]
pub struct MappingRule {
    /// Field read from the source object
    pub source: String,

    /// Field written on the target object
    pub target: String,

    /// Written verbatim when the source value is missing
    pub default: Option<Value>,

    /// Convert list values element by element
    pub is_collection: bool,

    /// Conversion applied to present values
    pub conversion: Conversion,
}

impl MappingRule {
    /// Create a plain field-to-field rule
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            default: None,
            is_collection: false,
            conversion: Conversion::Plain,
        }
    }

    /// Set the default value
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Treat list values as collections
    #[must_use]
    pub fn collection(mut self) -> Self {
        self.is_collection = true;
        self
    }

    /// Add an expression step
    #[must_use]
    pub fn expr(
        self,
        expr: impl Fn(&Value) -> crate::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.shared_expr(Arc::new(expr))
    }

    /// Add an already shared expression step
    #[must_use]
    pub fn shared_expr(mut self, expr: Expr) -> Self {
        self.conversion = std::mem::take(&mut self.conversion).with_expr(expr);
        self
    }

    /// Add a nested converter step
    #[must_use]
    pub fn converter(mut self, converter: ConverterRef) -> Self {
        self.conversion = std::mem::take(&mut self.conversion).with_converter(converter);
        self
    }

    /// `source -> target`, used in logs and errors
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} -> {}", self.source, self.target)
    }
}
