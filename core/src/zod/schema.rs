#![deny(missing_docs)]

//! # Schema Compiler
//!
//! Lowers OpenAPI Schema Objects into [`ZodAst`] nodes.
//!
//! Rules are tried in priority order: `$ref`, `oneOf` + `discriminator`,
//! `allOf`, plain `oneOf`/`anyOf`, explicit `properties`, then the `type`
//! switch. `nullable` is applied last.

use crate::error::{AppError, AppResult};
use crate::oas::models::SchemaNode;
use crate::oas::refs::{name_from_ref, resolve, schema_component_name};
use crate::zod::ast::{NumberBounds, ObjectShape, ZodAst, ZodKind};
use serde_json::Value;
use tracing::debug;

/// Positional options that only affect primitive leaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Number / boolean leaves arrive as text (query parameters).
    pub coerce: bool,
    /// Compiling a header value; number / boolean leaves are coerced.
    pub is_header: bool,
}

impl CompileOptions {
    /// Options for query parameters.
    pub fn query() -> Self {
        Self {
            coerce: true,
            is_header: false,
        }
    }

    /// Options for request and response headers.
    pub fn header() -> Self {
        Self {
            coerce: false,
            is_header: true,
        }
    }

    fn coerces_primitives(&self) -> bool {
        self.coerce || self.is_header
    }
}

/// Maps a `$ref` to the name of the binding it refers to.
pub type RefNamer<'a> = Box<dyn Fn(&str) -> AppResult<String> + 'a>;

/// Compiles schemas of one document.
pub struct SchemaCompiler<'a> {
    root: &'a Value,
    ref_namer: RefNamer<'a>,
    /// References currently being inlined, innermost last.
    inlining: Vec<String>,
}

impl<'a> SchemaCompiler<'a> {
    /// Creates a compiler naming references with [`name_from_ref`].
    pub fn new(root: &'a Value) -> Self {
        Self::with_ref_namer(root, Box::new(name_from_ref))
    }

    /// Creates a compiler with a custom reference naming callback.
    pub fn with_ref_namer(root: &'a Value, ref_namer: RefNamer<'a>) -> Self {
        Self {
            root,
            ref_namer,
            inlining: Vec::new(),
        }
    }

    /// The document references are resolved against.
    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// Compiles one schema.
    ///
    /// # Errors
    ///
    /// * `InvalidDiscriminatedUnion` when a mapped `oneOf` target is not an object.
    /// * `InvalidEnum` for a string `enum` that is not a non-empty list of strings.
    /// * `MissingArrayItems` for an array without `items`.
    /// * Any resolution error raised while following `$ref`s.
    pub fn compile(&mut self, schema: &Value, options: CompileOptions) -> AppResult<ZodAst> {
        let node = SchemaNode::new(schema);
        let description = node.description().map(str::to_string);

        if let Some(reference) = node.reference() {
            if schema_component_name(reference).is_some() {
                let name = (self.ref_namer)(reference)?;
                return Ok(ZodAst {
                    kind: ZodKind::Reference(name),
                    description,
                });
            }
            return self.expand(reference, options, false);
        }

        let kind = self.lower(node, options)?;
        let ast = if node.nullable() {
            ZodAst {
                kind: ZodKind::Nullable(Box::new(ZodAst::new(kind))),
                description,
            }
        } else {
            ZodAst { kind, description }
        };
        Ok(ast)
    }

    fn lower(&mut self, node: SchemaNode<'_>, options: CompileOptions) -> AppResult<ZodKind> {
        if let (Some(alternatives), Some(discriminator)) = (node.one_of(), node.discriminator()) {
            let property = discriminator.property_name().ok_or_else(|| {
                AppError::InvalidDiscriminatedUnion("discriminator has no propertyName".into())
            })?;
            let mut variants = Vec::with_capacity(alternatives.len());
            for alternative in alternatives {
                let Some(reference) = SchemaNode::new(alternative).reference() else {
                    debug!(property, "Skipping inline oneOf alternative");
                    continue;
                };
                let Some(tag) = discriminator.tag_for(reference) else {
                    debug!(reference, "Skipping oneOf alternative without mapping entry");
                    continue;
                };
                let (mut shape, description) = self
                    .expand(reference, options, true)?
                    .into_object()
                    .map_err(|other| {
                        AppError::InvalidDiscriminatedUnion(format!(
                            "{} lowers to {}, expected object",
                            reference,
                            other.tag()
                        ))
                    })?;
                shape.insert(property, ZodAst::literal(tag), true);
                variants.push(ZodAst {
                    kind: ZodKind::Object(shape),
                    description,
                });
            }
            return Ok(ZodKind::DiscriminatedUnion {
                discriminator: property.to_string(),
                options: variants,
            });
        }

        if let Some(parts) = node.all_of() {
            let mut shape = ObjectShape::default();
            shape.required.extend(node.required().map(str::to_string));
            for part in parts {
                let compiled = match SchemaNode::new(part).reference() {
                    Some(reference) => self.expand(reference, options, true)?,
                    None => self.compile(part, options)?,
                };
                match compiled.into_object() {
                    Ok((part_shape, _)) => shape.absorb(part_shape),
                    Err(other) => debug!(tag = other.tag(), "Ignoring non-object allOf part"),
                }
            }
            // Sibling properties sit next to allOf and win over the parts.
            if node.properties().is_some() {
                shape.absorb(self.object_shape(node, options)?);
            }
            return Ok(ZodKind::Object(shape));
        }

        if let Some(alternatives) = node.one_of().or_else(|| node.any_of()) {
            let mut compiled = alternatives
                .iter()
                .map(|alt| self.compile(alt, options))
                .collect::<AppResult<Vec<_>>>()?;
            return Ok(match compiled.len() {
                0 => ZodKind::Any,
                1 => compiled.remove(0).kind,
                _ => ZodKind::Union(compiled),
            });
        }

        if node.properties().is_some() {
            return Ok(ZodKind::Object(self.object_shape(node, options)?));
        }

        let kind = match node.type_name() {
            Some("string") => {
                if node.format() == Some("date-time") {
                    ZodKind::Datetime
                } else if let Some(values) = node.enum_values() {
                    ZodKind::Enum(string_enum(values)?)
                } else {
                    ZodKind::String
                }
            }
            Some("number") | Some("integer") => {
                let bounds = NumberBounds {
                    min: node.minimum().cloned(),
                    max: node.maximum().cloned(),
                };
                coerce_if(ZodKind::Number(bounds), options)
            }
            Some("boolean") => coerce_if(ZodKind::Boolean, options),
            Some("array") => {
                let items = node.items().ok_or_else(|| {
                    AppError::MissingArrayItems(
                        node.description().unwrap_or("array schema").to_string(),
                    )
                })?;
                ZodKind::Array(Box::new(self.compile(items, options)?))
            }
            Some("object") => ZodKind::Object(ObjectShape::default()),
            _ => ZodKind::Any,
        };
        Ok(kind)
    }

    fn object_shape(&mut self, node: SchemaNode<'_>, options: CompileOptions) -> AppResult<ObjectShape> {
        let mut shape = ObjectShape::default();
        for (name, property) in node.properties().into_iter().flatten() {
            let compiled = self.compile(property, options)?;
            shape.properties.insert(name.clone(), compiled);
        }
        shape.required.extend(node.required().map(str::to_string));
        Ok(shape)
    }

    /// Resolves `reference` and compiles its target in place of the reference.
    ///
    /// With `follow_aliases`, a target that is itself a `$ref` is followed too,
    /// so that a named schema is expanded structurally instead of becoming a
    /// deferred reference.
    fn expand(
        &mut self,
        reference: &str,
        options: CompileOptions,
        follow_aliases: bool,
    ) -> AppResult<ZodAst> {
        if self.inlining.iter().any(|r| r == reference) {
            return Err(AppError::CircularReference(reference.to_string()));
        }
        let root = self.root;
        let target = resolve(root, reference)?;

        self.inlining.push(reference.to_string());
        let result = match SchemaNode::new(target).reference() {
            Some(next) if follow_aliases => self.expand(next, options, true),
            _ => self.compile(target, options),
        };
        self.inlining.pop();
        result
    }
}

fn coerce_if(kind: ZodKind, options: CompileOptions) -> ZodKind {
    if options.coerces_primitives() {
        ZodKind::Coerce(Box::new(ZodAst::new(kind)))
    } else {
        kind
    }
}

fn string_enum(values: &Value) -> AppResult<Vec<String>> {
    let list = values
        .as_array()
        .ok_or_else(|| AppError::InvalidEnum(format!("expected an array, got {}", values)))?;
    if list.is_empty() {
        return Err(AppError::InvalidEnum("enum has no values".into()));
    }
    list.iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| AppError::InvalidEnum(format!("non-string enum value {}", v)))
        })
        .collect()
}
