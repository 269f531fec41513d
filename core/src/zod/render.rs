#![deny(missing_docs)]

//! # Code Renderer
//!
//! Serializes a [`ZodAst`] into Zod expression source text. A single
//! pre-order traversal; references are emitted as `z.lazy(() => name)` and
//! never resolved here.

use crate::error::{AppError, AppResult};
use crate::zod::ast::{NumberBounds, ObjectShape, ZodAst, ZodKind};
use serde_json::Value;

/// Renders one validator expression.
///
/// # Errors
///
/// * `UnsupportedCoercion` when a coercion wraps anything but a number or boolean.
/// * `InvalidComposition` for an empty merge or union.
pub fn render(ast: &ZodAst) -> AppResult<String> {
    let mut code = match &ast.kind {
        ZodKind::Object(shape) => format!("z.object({})", render_shape(shape)?),
        ZodKind::String => "z.string()".to_string(),
        ZodKind::Number(bounds) => with_bounds("z.number()", bounds),
        ZodKind::Boolean => "z.boolean()".to_string(),
        ZodKind::Datetime => "z.string().datetime()".to_string(),
        ZodKind::Any => "z.any()".to_string(),
        ZodKind::Undefined => "z.undefined()".to_string(),
        ZodKind::Array(items) => format!("z.array({})", render(items)?),
        ZodKind::Enum(values) => {
            let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
            format!("z.enum([{}])", quoted.join(", "))
        }
        ZodKind::Literal(value) => format!("z.literal({})", value),
        ZodKind::Reference(name) => format!("z.lazy(() => {})", name),
        ZodKind::Coerce(inner) => match &inner.kind {
            ZodKind::Number(bounds) => with_bounds("z.coerce.number()", bounds),
            ZodKind::Boolean => "z.coerce.boolean()".to_string(),
            _ => {
                return Err(AppError::UnsupportedCoercion(format!(
                    "cannot coerce {}, only number and boolean",
                    inner.tag()
                )))
            }
        },
        ZodKind::Nullable(inner) => format!("{}.nullable()", render(inner)?),
        ZodKind::Optional(inner) => format!("{}.optional()", render(inner)?),
        ZodKind::Default { inner, value } => format!("{}.default({})", render(inner)?, value),
        ZodKind::Union(options) => match options.as_slice() {
            [] => return Err(AppError::InvalidComposition("union without options".into())),
            [single] => render(single)?,
            _ => format!("z.union([{}])", render_list(options)?),
        },
        ZodKind::DiscriminatedUnion {
            discriminator,
            options,
        } => format!(
            "z.discriminatedUnion({}, [{}])",
            quote(discriminator),
            render_list(options)?
        ),
        ZodKind::Merge(parts) => {
            let (first, rest) = parts
                .split_first()
                .ok_or_else(|| AppError::InvalidComposition("merge without parts".into()))?;
            let mut code = render(first)?;
            for part in rest {
                code = format!("{}.merge({})", code, render(part)?);
            }
            code
        }
        ZodKind::Extend { base, shape } => {
            format!("{}.extend({})", render(base)?, render_shape(shape)?)
        }
    };

    if let Some(description) = &ast.description {
        code.push_str(&format!(".describe({})", quote(description)));
    }
    Ok(code)
}

fn render_shape(shape: &ObjectShape) -> AppResult<String> {
    if shape.is_empty() {
        return Ok("{}".to_string());
    }
    let mut fields = Vec::with_capacity(shape.properties.len());
    for (name, node) in &shape.properties {
        let mut field = format!("{}: {}", quote(name), render(node)?);
        if !shape.required.contains(name) {
            field.push_str(".optional()");
        }
        fields.push(field);
    }
    Ok(format!("{{ {} }}", fields.join(", ")))
}

fn render_list(nodes: &[ZodAst]) -> AppResult<String> {
    let rendered = nodes.iter().map(render).collect::<AppResult<Vec<_>>>()?;
    Ok(rendered.join(", "))
}

fn with_bounds(base: &str, bounds: &NumberBounds) -> String {
    let mut code = base.to_string();
    if let Some(min) = &bounds.min {
        code.push_str(&format!(".min({})", min));
    }
    if let Some(max) = &bounds.max {
        code.push_str(&format!(".max({})", max));
    }
    code
}

/// JSON string literal, which is also a valid TypeScript string literal.
pub(crate) fn quote(s: &str) -> String {
    Value::from(s).to_string()
}
