#![deny(missing_docs)]

//! # Operation Compiler
//!
//! Builds request and response validators for one path + method.
//!
//! The request validator is an object of `method`, `path`, `query`, optional
//! `headers` and `body`. The response validator is a union of one
//! `{ status, headers, body }` branch per declared status code.

use crate::error::{AppError, AppResult};
use crate::oas::document::OperationEntry;
use crate::oas::models::ParamLocation;
use crate::oas::refs::resolve_object;
use crate::zod::ast::{NumberBounds, ObjectShape, ZodAst, ZodKind};
use crate::zod::schema::{CompileOptions, SchemaCompiler};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;
use tracing::debug;

/// Header carrying the media type of a request or response variant.
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Validators compiled for one operation (and one request media type when
/// the operation declares several).
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledOperation {
    /// Path template.
    pub path: String,
    /// Lower-case HTTP method.
    pub method: String,
    /// Request media type this variant was compiled for, if the body declares one.
    pub content_type: Option<String>,
    /// Request validator.
    pub request: ZodAst,
    /// Response validator.
    pub response: ZodAst,
}

/// One request body variant.
struct BodyVariant {
    content_type: Option<String>,
    body: ZodAst,
}

/// Compiles one operation into one or more request / response pairs.
///
/// Operations declaring several request media types yield one pair per media
/// type, each tagged with a `Content-Type` literal header.
///
/// # Errors
///
/// * `MissingParameterSchema` for a path / query / header parameter without `schema`.
/// * `NoResponsesDefined` if `responses` is absent or empty.
/// * `UnsupportedStatusCode` for a response key that is not a code, range or `default`.
/// * Any error raised by the schema compiler or reference resolution.
pub fn compile_operation(
    compiler: &mut SchemaCompiler<'_>,
    entry: &OperationEntry<'_>,
) -> AppResult<Vec<CompiledOperation>> {
    let root = compiler.root();
    let label = format!("{} {}", entry.method.to_uppercase(), entry.path);

    let mut path_shape = ObjectShape::default();
    let mut query_shape = ObjectShape::default();
    let mut header_shape = ObjectShape::default();

    for parameter in merged_parameters(root, entry)? {
        let name = parameter.get("name").and_then(Value::as_str).unwrap_or_default();
        let location = parameter.get("in").and_then(Value::as_str).unwrap_or_default();
        let (shape, options) = match ParamLocation::parse(location) {
            Some(ParamLocation::Path) => (&mut path_shape, CompileOptions::default()),
            Some(ParamLocation::Query) => (&mut query_shape, CompileOptions::query()),
            Some(ParamLocation::Header) => (&mut header_shape, CompileOptions::header()),
            Some(ParamLocation::Cookie) | None => {
                debug!(name, location, "Ignoring parameter");
                continue;
            }
        };
        let schema = parameter.get("schema").ok_or_else(|| {
            AppError::MissingParameterSchema(format!("{} parameter `{}` of {}", location, name, label))
        })?;
        let mut compiled = compiler.compile(schema, options)?;
        if let Some(description) = parameter.get("description").and_then(Value::as_str) {
            compiled.description = Some(description.to_string());
        }
        shape.insert(name, compiled, is_required(parameter));
    }

    let variants = body_variants(compiler, entry.operation)?;
    let tagged = variants.len() > 1;
    let responses = entry
        .operation
        .get("responses")
        .and_then(Value::as_object)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::NoResponsesDefined(label.clone()))?;

    let mut compiled = Vec::with_capacity(variants.len());
    for variant in variants {
        let mut headers = header_shape.clone();
        if let (true, Some(content_type)) = (tagged, variant.content_type.as_deref()) {
            headers.insert(CONTENT_TYPE_HEADER, ZodAst::literal(content_type), true);
        }

        let mut request = ObjectShape::default();
        request.insert("method", ZodAst::literal(entry.method), true);
        request.insert("path", params_object(path_shape.clone()), true);
        request.insert("query", params_object(query_shape.clone()), true);
        if !headers.is_empty() {
            request.insert("headers", ZodAst::object(headers), true);
        }
        request.insert("body", variant.body, true);

        let preferred = if tagged {
            variant.content_type.as_deref()
        } else {
            None
        };
        let response = compile_responses(compiler, responses, preferred, tagged)?;

        compiled.push(CompiledOperation {
            path: entry.path.to_string(),
            method: entry.method.to_string(),
            content_type: variant.content_type,
            request: ZodAst::object(request),
            response,
        });
    }
    debug!(operation = %label, variants = compiled.len(), "Compiled operation");
    Ok(compiled)
}

/// Path-level parameters overridden by operation parameters with the same
/// `(name, in)`, all resolved.
fn merged_parameters<'v>(root: &'v Value, entry: &OperationEntry<'v>) -> AppResult<Vec<&'v Value>> {
    let own = entry
        .operation
        .get("parameters")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let mut merged: IndexMap<(String, String), &'v Value> = IndexMap::new();
    for raw in entry.path_parameters.iter().chain(own) {
        let parameter = resolve_object(root, raw)?;
        let key = (
            parameter.get("name").and_then(Value::as_str).unwrap_or_default().to_string(),
            parameter.get("in").and_then(Value::as_str).unwrap_or_default().to_string(),
        );
        merged.insert(key, parameter);
    }
    Ok(merged.into_values().collect())
}

fn is_required(value: &Value) -> bool {
    value.get("required").and_then(Value::as_bool).unwrap_or(false)
}

/// Empty parameter groups validate a missing value as `{}`.
fn params_object(shape: ObjectShape) -> ZodAst {
    if shape.is_empty() {
        ZodAst::object(shape).optional().default_to(json!({}))
    } else {
        ZodAst::object(shape)
    }
}

fn body_variants(
    compiler: &mut SchemaCompiler<'_>,
    operation: &Value,
) -> AppResult<Vec<BodyVariant>> {
    let Some(raw) = operation.get("requestBody") else {
        return Ok(vec![BodyVariant {
            content_type: None,
            body: ZodAst::new(ZodKind::Undefined),
        }]);
    };
    let root = compiler.root();
    let request_body = resolve_object(root, raw)?;
    let required = is_required(request_body);
    let content = request_body
        .get("content")
        .and_then(Value::as_object)
        .filter(|c| !c.is_empty());

    let Some(content) = content else {
        let body = ZodAst::new(ZodKind::Undefined);
        return Ok(vec![BodyVariant {
            content_type: None,
            body: if required { body } else { body.optional() },
        }]);
    };

    let mut variants = Vec::with_capacity(content.len());
    for (content_type, media) in content {
        let body = match media.get("schema") {
            Some(schema) => compiler.compile(schema, CompileOptions::default())?,
            None => ZodAst::new(ZodKind::Any),
        };
        variants.push(BodyVariant {
            content_type: Some(content_type.clone()),
            body: if required { body } else { body.optional() },
        });
    }
    Ok(variants)
}

/// Classification of a response key.
enum StatusKey {
    Code(u16),
    Range(u16),
    Default,
}

fn classify_status(key: &str) -> AppResult<StatusKey> {
    static CODE_RE: OnceLock<Regex> = OnceLock::new();
    static RANGE_RE: OnceLock<Regex> = OnceLock::new();
    let code_re = CODE_RE.get_or_init(|| Regex::new(r"^\d+$").expect("Invalid regex constant"));
    let range_re =
        RANGE_RE.get_or_init(|| Regex::new(r"^[1-5][xX]{2}$").expect("Invalid regex constant"));

    if key == "default" {
        return Ok(StatusKey::Default);
    }
    if code_re.is_match(key) {
        return key
            .parse::<u16>()
            .map(StatusKey::Code)
            .map_err(|_| AppError::UnsupportedStatusCode(key.to_string()));
    }
    if range_re.is_match(key) {
        let class = key[..1]
            .parse::<u16>()
            .map_err(|_| AppError::UnsupportedStatusCode(key.to_string()))?;
        return Ok(StatusKey::Range(class));
    }
    Err(AppError::UnsupportedStatusCode(key.to_string()))
}

fn status_node(key: &StatusKey) -> ZodAst {
    let bounded = |min: u16, max: u16| {
        ZodAst::new(ZodKind::Number(NumberBounds {
            min: Some(min.into()),
            max: Some(max.into()),
        }))
    };
    match key {
        StatusKey::Code(code) => ZodAst::literal(*code),
        StatusKey::Range(class) => bounded(class * 100, class * 100 + 99),
        StatusKey::Default => bounded(100, 599),
    }
}

fn compile_responses(
    compiler: &mut SchemaCompiler<'_>,
    responses: &Map<String, Value>,
    request_content_type: Option<&str>,
    tagged: bool,
) -> AppResult<ZodAst> {
    let root = compiler.root();
    let mut branches = Vec::new();
    let mut defaults = Vec::new();

    for (key, raw) in responses {
        let status = classify_status(key)?;
        let response = resolve_object(root, raw)?;
        let headers = response_headers(compiler, response)?;
        let content = response
            .get("content")
            .and_then(Value::as_object)
            .filter(|c| !c.is_empty());

        // (media type to tag the branch with, media object)
        let mut bodies: Vec<(Option<&str>, Option<&Value>)> = Vec::new();
        match content {
            None => bodies.push((None, None)),
            Some(content) if tagged && key == "200" => {
                let media = request_content_type
                    .and_then(|ct| content.get(ct))
                    .or_else(|| select_media(content));
                bodies.push((None, media));
            }
            Some(content) if tagged && content.len() > 1 => {
                bodies.extend(content.iter().map(|(ct, media)| (Some(ct.as_str()), Some(media))));
            }
            Some(content) => bodies.push((None, select_media(content))),
        }

        let target = if matches!(status, StatusKey::Default) {
            &mut defaults
        } else {
            &mut branches
        };
        for (content_type, media) in bodies {
            let body = match media {
                None => ZodAst::new(ZodKind::Undefined),
                Some(media) => match media.get("schema") {
                    Some(schema) => compiler.compile(schema, CompileOptions::default())?,
                    None => ZodAst::new(ZodKind::Any),
                },
            };
            let mut header_shape = headers.clone();
            if let Some(content_type) = content_type {
                header_shape.insert(CONTENT_TYPE_HEADER, ZodAst::literal(content_type), true);
            }

            let mut branch = ObjectShape::default();
            branch.insert("status", status_node(&status), true);
            branch.insert(
                "headers",
                ZodAst::object(header_shape).with_description(Some("Response headers")),
                true,
            );
            branch.insert("body", body, true);
            target.push(ZodAst::object(branch));
        }
    }

    branches.extend(defaults);
    Ok(if branches.len() == 1 {
        branches.remove(0)
    } else {
        ZodAst::new(ZodKind::Union(branches))
    })
}

fn response_headers(compiler: &mut SchemaCompiler<'_>, response: &Value) -> AppResult<ObjectShape> {
    let root = compiler.root();
    let mut shape = ObjectShape::default();
    let Some(headers) = response.get("headers").and_then(Value::as_object) else {
        return Ok(shape);
    };
    let empty = json!({});
    for (name, raw) in headers {
        let header = resolve_object(root, raw)?;
        let schema = header.get("schema").unwrap_or(&empty);
        let mut compiled = compiler.compile(schema, CompileOptions::header())?;
        if let Some(description) = header.get("description").and_then(Value::as_str) {
            compiled.description = Some(description.to_string());
        }
        shape.insert(name.as_str(), compiled, is_required(header));
    }
    Ok(shape)
}

/// Picks the media type whose schema validates a response body.
///
/// Preference: `application/json`, any `+json`, `application/*`, `*/*`,
/// then the first declared entry.
fn select_media(content: &Map<String, Value>) -> Option<&Value> {
    if let Some(media) = content.get("application/json") {
        return Some(media);
    }

    if let Some((_, media)) = content.iter().find(|(k, _)| k.ends_with("+json")) {
        return Some(media);
    }

    if let Some(media) = content.get("application/*") {
        return Some(media);
    }

    if let Some(media) = content.get("*/*") {
        return Some(media);
    }

    content.iter().next().map(|(_, media)| media)
}
