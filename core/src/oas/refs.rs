#![deny(missing_docs)]

//! # Reference Resolution
//!
//! Helpers for resolving `$ref` values against a single in-memory document.
//!
//! Only local JSON Pointers (`#/...`) are followed. Relative and remote
//! references are classified so they can be reported, but never fetched.

use crate::error::{AppError, AppResult};
use derive_more::Display;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use url::Url;

/// Where a `$ref` points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReferenceKind {
    /// `#/...` inside the current document.
    #[display("local")]
    Local,
    /// A relative document path, e.g. `common.yaml#/components/schemas/Pet`.
    #[display("relative")]
    Relative,
    /// An absolute URI with a scheme, e.g. `https://example.com/api.yaml#/...`.
    #[display("remote")]
    Remote,
}

/// A `$ref` split into its document part and fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference<'a> {
    /// Document part before `#` (empty for local references).
    pub document: &'a str,
    /// Fragment after `#`, if any.
    pub fragment: Option<&'a str>,
    /// Classification of the document part.
    pub kind: ReferenceKind,
}

/// A reference into `#/components/<kind>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentRef {
    /// Component section, e.g. `schemas` or `parameters`.
    pub kind: String,
    /// Decoded component name.
    pub name: String,
}

/// Splits a `$ref` string and classifies it.
pub fn parse_reference(reference: &str) -> ParsedReference<'_> {
    let (document, fragment) = match reference.split_once('#') {
        Some((doc, frag)) => (doc, Some(frag)),
        None => (reference, None),
    };

    let kind = if document.is_empty() {
        ReferenceKind::Local
    } else if Url::parse(document).is_ok() {
        ReferenceKind::Remote
    } else {
        ReferenceKind::Relative
    };

    ParsedReference {
        document,
        fragment,
        kind,
    }
}

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent-encoding).
pub fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Escapes a raw key for use as a JSON Pointer segment.
pub fn encode_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Builds the local pointer `#/components/<kind>/<name>`.
pub fn pointer_for_component(kind: &str, name: &str) -> String {
    format!(
        "#/components/{}/{}",
        encode_pointer_segment(kind),
        encode_pointer_segment(name)
    )
}

/// Returns the decoded segments of a local reference, or fails if the
/// reference is not a `#`/`#/...` pointer.
///
/// The error names the reference kind, e.g.
/// `other.yaml#/Pet (relative reference)`.
fn local_segments(reference: &str) -> AppResult<Vec<String>> {
    if reference == "#" {
        return Ok(Vec::new());
    }
    let Some(pointer) = reference.strip_prefix("#/") else {
        let parsed = parse_reference(reference);
        let kind = match parsed.kind {
            ReferenceKind::Local => "malformed local".to_string(),
            other => other.to_string(),
        };
        return Err(AppError::UnsupportedReferenceKind(format!(
            "{} ({} reference)",
            reference, kind
        )));
    };
    Ok(pointer.split('/').map(decode_pointer_segment).collect())
}

/// Resolves a local reference against the document root.
///
/// Objects are walked by key and arrays by index.
///
/// # Errors
///
/// * `UnsupportedReferenceKind` if the reference is not `#` or `#/...`.
/// * `ReferenceNotFound` if any segment is missing.
pub fn resolve<'a>(root: &'a Value, reference: &str) -> AppResult<&'a Value> {
    let mut current = root;
    for segment in local_segments(reference)? {
        let next = match current {
            Value::Object(map) => map.get(&segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        current = next.ok_or_else(|| AppError::ReferenceNotFound(reference.to_string()))?;
    }
    Ok(current)
}

/// Follows a chain of `$ref`s on a parameter, response, header or request body
/// object until a concrete object is reached.
///
/// Sibling keys next to a `$ref` are ignored, as OpenAPI 3.0 requires.
pub fn resolve_object<'a>(root: &'a Value, value: &'a Value) -> AppResult<&'a Value> {
    let mut current = value;
    let mut visited: Vec<&str> = Vec::new();
    while let Some(reference) = current.get("$ref").and_then(Value::as_str) {
        if visited.contains(&reference) {
            return Err(AppError::CircularReference(reference.to_string()));
        }
        visited.push(reference);
        current = resolve(root, reference)?;
    }
    Ok(current)
}

/// Derives the validator binding name for a reference.
///
/// `#/components/schemas/Pet` becomes `petSchema`. The name comes from the
/// final pointer segment only, so two references with the same final segment
/// map to the same binding.
///
/// # Errors
///
/// * `InvalidReference` if the reference has no non-empty trailing segment.
pub fn name_from_ref(reference: &str) -> AppResult<String> {
    let last = reference
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty() && !s.starts_with('#'))
        .ok_or_else(|| AppError::InvalidReference(reference.to_string()))?;
    let decoded = decode_pointer_segment(last);
    if decoded.is_empty() {
        return Err(AppError::InvalidReference(reference.to_string()));
    }

    let mut name = String::with_capacity(decoded.len() + 6);
    for (i, c) in decoded.chars().enumerate() {
        if i == 0 {
            if c.is_ascii_digit() {
                name.push('_');
                name.push(c);
                continue;
            }
            name.extend(c.to_lowercase());
        } else if c.is_alphanumeric() || c == '_' || c == '$' {
            name.push(c);
        } else {
            name.push('_');
        }
    }
    // First char may itself have been an invalid identifier char.
    if let Some(first) = name.chars().next() {
        if !(first.is_alphabetic() || first == '_' || first == '$') {
            name.replace_range(..first.len_utf8(), "_");
        }
    }
    name.push_str("Schema");
    Ok(name)
}

/// Returns the component name when `reference` is exactly
/// `#/components/schemas/<name>`.
pub fn schema_component_name(reference: &str) -> Option<String> {
    let rest = reference.strip_prefix("#/components/schemas/")?;
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some(decode_pointer_segment(rest))
}

/// Classifies a reference into `#/components/<kind>/<name>`.
///
/// Deeper pointers (e.g. `#/components/schemas/Pet/properties/id`) are
/// attributed to the component that contains them. Local references outside
/// `components` yield `None`.
///
/// # Errors
///
/// * `UnsupportedReferenceKind` for relative or remote references.
pub fn component_target(reference: &str) -> AppResult<Option<ComponentRef>> {
    let segments = local_segments(reference)?;
    if segments.len() < 3 || segments[0] != "components" {
        return Ok(None);
    }
    if segments[1].is_empty() || segments[2].is_empty() {
        return Ok(None);
    }
    Ok(Some(ComponentRef {
        kind: segments[1].clone(),
        name: segments[2].clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_reference_kinds() {
        assert_eq!(
            parse_reference("#/components/schemas/Pet").kind,
            ReferenceKind::Local
        );
        assert_eq!(
            parse_reference("common.yaml#/components/schemas/Pet").kind,
            ReferenceKind::Relative
        );
        let remote = parse_reference("https://example.com/api.yaml#/components/schemas/Pet");
        assert_eq!(remote.kind, ReferenceKind::Remote);
        assert_eq!(remote.fragment, Some("/components/schemas/Pet"));
    }

    #[test]
    fn test_decode_pointer_segment() {
        assert_eq!(decode_pointer_segment("a~1b~0c"), "a/b~c");
        assert_eq!(decode_pointer_segment("User%20Name"), "User Name");
    }

    #[test]
    fn test_resolve_walks_objects_and_arrays() {
        let doc = json!({
            "components": {"schemas": {"Pet": {"type": "object"}}},
            "list": [{"a": 1}, {"b": 2}],
            "a/b": {"x": true}
        });
        assert_eq!(
            resolve(&doc, "#/components/schemas/Pet").unwrap(),
            &json!({"type": "object"})
        );
        assert_eq!(resolve(&doc, "#/list/1/b").unwrap(), &json!(2));
        assert_eq!(resolve(&doc, "#/a~1b/x").unwrap(), &json!(true));
        assert_eq!(resolve(&doc, "#").unwrap(), &doc);
    }

    #[test]
    fn test_resolve_errors() {
        let doc = json!({"components": {}});
        assert!(matches!(
            resolve(&doc, "#/components/schemas/Missing"),
            Err(AppError::ReferenceNotFound(_))
        ));
        assert!(matches!(
            resolve(&doc, "http://x/y.yaml#/a"),
            Err(AppError::UnsupportedReferenceKind(_))
        ));
        assert!(matches!(
            resolve(&doc, "other.yaml#/a"),
            Err(AppError::UnsupportedReferenceKind(_))
        ));
    }

    #[test]
    fn test_unsupported_references_name_their_kind() {
        let doc = json!({});
        let message = |reference: &str| match resolve(&doc, reference) {
            Err(AppError::UnsupportedReferenceKind(message)) => message,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(message("other.yaml#/a"), "other.yaml#/a (relative reference)");
        assert_eq!(
            message("https://example.com/api.yaml#/a"),
            "https://example.com/api.yaml#/a (remote reference)"
        );
        assert_eq!(message("#a"), "#a (malformed local reference)");
        assert_eq!(
            component_target("../pets.yaml")
                .unwrap_err()
                .to_string(),
            "Unsupported reference kind: ../pets.yaml (relative reference)"
        );
    }

    #[test]
    fn test_resolve_object_follows_chain_and_detects_loop() {
        let doc = json!({
            "components": {
                "parameters": {
                    "Alias": {"$ref": "#/components/parameters/Id"},
                    "Id": {"name": "id", "in": "path"},
                    "LoopA": {"$ref": "#/components/parameters/LoopB"},
                    "LoopB": {"$ref": "#/components/parameters/LoopA"}
                }
            }
        });
        let start = json!({"$ref": "#/components/parameters/Alias"});
        let resolved = resolve_object(&doc, &start).unwrap();
        assert_eq!(resolved["name"], "id");

        let looping = json!({"$ref": "#/components/parameters/LoopA"});
        assert!(matches!(
            resolve_object(&doc, &looping),
            Err(AppError::CircularReference(_))
        ));
    }

    #[test]
    fn test_name_from_ref() {
        assert_eq!(
            name_from_ref("#/components/schemas/Pet").unwrap(),
            "petSchema"
        );
        assert_eq!(
            name_from_ref("#/components/schemas/HubDetails").unwrap(),
            "hubDetailsSchema"
        );
        assert_eq!(
            name_from_ref("#/components/schemas/pet-store.Item").unwrap(),
            "pet_store_ItemSchema"
        );
        assert_eq!(
            name_from_ref("#/components/schemas/1Thing").unwrap(),
            "_1ThingSchema"
        );
        assert!(matches!(
            name_from_ref("#/components/schemas/"),
            Err(AppError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_name_collision_is_shared() {
        // Same trailing segment under different sections collapses to one name.
        assert_eq!(
            name_from_ref("#/components/schemas/Error").unwrap(),
            name_from_ref("#/components/responses/Error").unwrap()
        );
    }

    #[test]
    fn test_schema_component_name() {
        assert_eq!(
            schema_component_name("#/components/schemas/Pet").as_deref(),
            Some("Pet")
        );
        assert_eq!(
            schema_component_name("#/components/schemas/Pet/properties/id"),
            None
        );
        assert_eq!(schema_component_name("#/components/parameters/Id"), None);
    }

    #[test]
    fn test_component_target() {
        let target = component_target("#/components/schemas/Pet/properties/id")
            .unwrap()
            .unwrap();
        assert_eq!(target.kind, "schemas");
        assert_eq!(target.name, "Pet");
        assert_eq!(component_target("#/paths/~1pets").unwrap(), None);
        assert!(component_target("https://x/y#/components/schemas/A").is_err());
    }

    #[test]
    fn test_pointer_for_component_round_trips() {
        let doc = json!({"components": {"schemas": {"a/b": {"type": "string"}}}});
        let pointer = pointer_for_component("schemas", "a/b");
        assert_eq!(pointer, "#/components/schemas/a~1b");
        assert_eq!(resolve(&doc, &pointer).unwrap()["type"], "string");
    }
}
