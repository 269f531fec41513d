#![deny(missing_docs)]

//! # Validator AST
//!
//! Target-independent tree describing a runtime validator. Produced by the
//! schema and operation compilers and consumed by the renderer.

use indexmap::{IndexMap, IndexSet};
use serde_json::{Number, Value};

/// A validator node plus its optional human readable description.
#[derive(Debug, Clone, PartialEq)]
pub struct ZodAst {
    /// What the node validates.
    pub kind: ZodKind,
    /// Attached as trailing documentation metadata when rendered.
    pub description: Option<String>,
}

/// The node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ZodKind {
    /// Object with ordered properties.
    Object(ObjectShape),
    /// Any string.
    String,
    /// Any number, optionally bounded.
    Number(NumberBounds),
    /// `true` / `false`.
    Boolean,
    /// ISO-8601 date-time string.
    Datetime,
    /// Unchecked passthrough.
    Any,
    /// Absence marker (e.g. a body that does not exist).
    Undefined,
    /// Homogeneous array.
    Array(Box<ZodAst>),
    /// One of a fixed set of strings.
    Enum(Vec<String>),
    /// Exactly one JSON value.
    Literal(Value),
    /// Deferred lookup of another top-level binding by name.
    Reference(String),
    /// A number or boolean that arrives as text and must be parsed.
    Coerce(Box<ZodAst>),
    /// Inner or `null`.
    Nullable(Box<ZodAst>),
    /// Inner or absent.
    Optional(Box<ZodAst>),
    /// Inner, with a fallback value when absent.
    Default {
        /// Wrapped node.
        inner: Box<ZodAst>,
        /// Fallback value.
        value: Value,
    },
    /// Any of the options.
    Union(Vec<ZodAst>),
    /// Tagged union selected by the value of `discriminator`.
    DiscriminatedUnion {
        /// Tag property name.
        discriminator: String,
        /// Object options, each carrying the tag as a literal.
        options: Vec<ZodAst>,
    },
    /// Property-set combination of object nodes, left to right.
    Merge(Vec<ZodAst>),
    /// `base` with additional properties.
    Extend {
        /// Node being extended.
        base: Box<ZodAst>,
        /// Added or overriding properties.
        shape: ObjectShape,
    },
}

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberBounds {
    /// Lower bound.
    pub min: Option<Number>,
    /// Upper bound.
    pub max: Option<Number>,
}

/// Properties and required names of an object node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectShape {
    /// Properties in declaration order.
    pub properties: IndexMap<String, ZodAst>,
    /// Names that must be present.
    pub required: IndexSet<String>,
}

impl ObjectShape {
    /// Adds a property. `required` controls membership in the required set.
    pub fn insert(&mut self, name: impl Into<String>, node: ZodAst, required: bool) {
        let name = name.into();
        if required {
            self.required.insert(name.clone());
        }
        self.properties.insert(name, node);
    }

    /// Folds `other` into `self`. Colliding properties take `other`'s node
    /// (last wins); required sets are unioned.
    pub fn absorb(&mut self, other: ObjectShape) {
        self.properties.extend(other.properties);
        self.required.extend(other.required);
    }

    /// `true` when the object has no properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl ZodAst {
    /// Node without description.
    pub fn new(kind: ZodKind) -> Self {
        Self {
            kind,
            description: None,
        }
    }

    /// Replaces the description.
    pub fn with_description(mut self, description: Option<impl Into<String>>) -> Self {
        self.description = description.map(Into::into);
        self
    }

    /// Object node.
    pub fn object(shape: ObjectShape) -> Self {
        Self::new(ZodKind::Object(shape))
    }

    /// Unbounded number.
    pub fn number() -> Self {
        Self::new(ZodKind::Number(NumberBounds::default()))
    }

    /// Literal node.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::new(ZodKind::Literal(value.into()))
    }

    /// Wraps `self` in `Optional`.
    pub fn optional(self) -> Self {
        Self::new(ZodKind::Optional(Box::new(self)))
    }

    /// Wraps `self` in `Default`.
    pub fn default_to(self, value: Value) -> Self {
        Self::new(ZodKind::Default {
            inner: Box::new(self),
            value,
        })
    }

    /// Shape of an object node.
    pub fn as_object(&self) -> Option<&ObjectShape> {
        match &self.kind {
            ZodKind::Object(shape) => Some(shape),
            _ => None,
        }
    }

    /// Unwraps an object node into its shape, keeping the description.
    pub fn into_object(self) -> Result<(ObjectShape, Option<String>), Self> {
        match self.kind {
            ZodKind::Object(shape) => Ok((shape, self.description)),
            kind => Err(Self {
                kind,
                description: self.description,
            }),
        }
    }

    /// Short tag name, used in error messages.
    pub fn tag(&self) -> &'static str {
        match &self.kind {
            ZodKind::Object(_) => "object",
            ZodKind::String => "string",
            ZodKind::Number(_) => "number",
            ZodKind::Boolean => "boolean",
            ZodKind::Datetime => "datetime",
            ZodKind::Any => "any",
            ZodKind::Undefined => "undefined",
            ZodKind::Array(_) => "array",
            ZodKind::Enum(_) => "enum",
            ZodKind::Literal(_) => "literal",
            ZodKind::Reference(_) => "reference",
            ZodKind::Coerce(_) => "coerce",
            ZodKind::Nullable(_) => "nullable",
            ZodKind::Optional(_) => "optional",
            ZodKind::Default { .. } => "default",
            ZodKind::Union(_) => "union",
            ZodKind::DiscriminatedUnion { .. } => "discriminatedUnion",
            ZodKind::Merge(_) => "merge",
            ZodKind::Extend { .. } => "extend",
        }
    }
}
