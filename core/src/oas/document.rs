#![deny(missing_docs)]

//! # OpenAPI Document Loading
//!
//! Parses YAML or JSON text into the raw document tree and enumerates the
//! operations it declares.

use crate::error::{AppError, AppResult};
use serde_json::Value;
use tracing::warn;

/// HTTP methods recognised as operations inside a Path Item Object.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// A single operation together with the path-level context it inherits.
#[derive(Debug, Clone, Copy)]
pub struct OperationEntry<'a> {
    /// Path template, e.g. `/pets/{id}`.
    pub path: &'a str,
    /// Lower-case HTTP method.
    pub method: &'a str,
    /// The Operation Object.
    pub operation: &'a Value,
    /// Parameters declared on the Path Item, if any.
    pub path_parameters: &'a [Value],
}

/// Parses an OpenAPI document from YAML or JSON text.
///
/// JSON is a subset of YAML, so both go through `serde_yaml`. The root must be
/// a mapping. Versions other than 3.0.x are accepted with a warning.
pub fn parse_document(content: &str) -> AppResult<Value> {
    let raw_value: Value = serde_yaml::from_str(content)
        .map_err(|e| AppError::General(format!("Failed to parse OpenAPI YAML: {}", e)))?;

    if !raw_value.is_object() {
        return Err(AppError::InvalidSpec(
            "document root must be an object".into(),
        ));
    }

    match raw_value.get("openapi").and_then(Value::as_str) {
        Some(v) if v.starts_with("3.0") => {}
        Some(v) => warn!(version = v, "Only OpenAPI 3.0.x is supported, continuing anyway"),
        None => warn!("Document has no `openapi` version field"),
    }

    Ok(raw_value)
}

/// Returns the `paths` object or fails with `InvalidSpec`.
pub fn paths(document: &Value) -> AppResult<&serde_json::Map<String, Value>> {
    document
        .get("paths")
        .and_then(Value::as_object)
        .ok_or_else(|| AppError::InvalidSpec("document has no `paths` object".into()))
}

/// Lists the operations of one Path Item in method order as written.
pub fn path_operations<'a>(path: &'a str, item: &'a Value) -> Vec<OperationEntry<'a>> {
    let Some(map) = item.as_object() else {
        return Vec::new();
    };
    let path_parameters = map
        .get("parameters")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    map.iter()
        .filter(|(key, _)| HTTP_METHODS.contains(&key.as_str()))
        .map(|(method, operation)| OperationEntry {
            path,
            method,
            operation,
            path_parameters,
        })
        .collect()
}

/// Lists every operation in the document, in document order.
pub fn operations(document: &Value) -> AppResult<Vec<OperationEntry<'_>>> {
    Ok(paths(document)?
        .iter()
        .flat_map(|(path, item)| path_operations(path, item))
        .collect())
}
