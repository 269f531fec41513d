#![deny(missing_docs)]

//! # Document Splitter
//!
//! Tree-shakes a full OpenAPI document into one self-contained document per
//! path. Each sub-document keeps the top-level metadata (`openapi`, `info`,
//! `servers`, ...), exactly one entry in `paths`, and only the components that
//! path transitively references.

use crate::error::{AppError, AppResult};
use crate::oas::document::paths;
use crate::oas::refs::{component_target, ComponentRef};
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};
use std::collections::VecDeque;
use tracing::debug;

/// Splits `document` into one sub-document per path template, in document order.
///
/// The input is never modified and the result only depends on the input.
///
/// # Errors
///
/// * `InvalidSpec` if the document has no `paths` object.
/// * `UnsupportedReferenceKind` if a reachable `$ref` is not local.
/// * `ReferenceNotFound` if a reachable component does not exist.
pub fn split_document(document: &Value) -> AppResult<IndexMap<String, Value>> {
    let path_items = paths(document)?;
    let mut result = IndexMap::with_capacity(path_items.len());
    for (path, item) in path_items {
        result.insert(path.clone(), build_path_document(document, path, item)?);
    }
    debug!(paths = result.len(), "Split document");
    Ok(result)
}

/// Derives the output file stem for a path template.
///
/// `/hub/{id}` becomes `hub_{id}`. The root path `/` becomes `index`.
pub fn path_file_stem(path: &str) -> String {
    let replaced = path.replace('/', "_");
    let stem = replaced.strip_prefix('_').unwrap_or(&replaced);
    if stem.is_empty() {
        "index".to_string()
    } else {
        stem.to_string()
    }
}

fn build_path_document(document: &Value, path: &str, item: &Value) -> AppResult<Value> {
    let mut out = Map::new();
    if let Some(root) = document.as_object() {
        for (key, value) in root {
            match key.as_str() {
                "paths" => {
                    let mut single = Map::new();
                    single.insert(path.to_string(), item.clone());
                    out.insert(key.clone(), Value::Object(single));
                }
                "components" => {}
                _ => {
                    out.insert(key.clone(), value.clone());
                }
            }
        }
    }

    let reachable = collect_reachable(document, item)?;
    if !reachable.is_empty() {
        out.insert("components".into(), Value::Object(copy_components(document, &reachable)));
    }
    Ok(Value::Object(out))
}

/// Breadth-first closure over component references starting at a path item.
fn collect_reachable(document: &Value, item: &Value) -> AppResult<IndexSet<ComponentRef>> {
    let components = document.get("components");
    let mut seen: IndexSet<ComponentRef> = IndexSet::new();
    let mut queue: VecDeque<&Value> = VecDeque::from([item]);

    // Security schemes are named by key, not by `$ref`.
    let mut scheme_names = IndexSet::new();
    collect_security_schemes(item, &mut scheme_names);
    if let Some(global) = document.get("security") {
        collect_requirement_names(global, &mut scheme_names);
    }
    for name in scheme_names {
        let target = ComponentRef {
            kind: "securitySchemes".into(),
            name,
        };
        if let Some(node) = lookup(components, &target) {
            if seen.insert(target) {
                queue.push_back(node);
            }
        }
    }

    while let Some(node) = queue.pop_front() {
        let mut refs = IndexSet::new();
        collect_refs(node, &mut refs);
        for reference in refs {
            let Some(target) = component_target(reference)? else {
                debug!(reference, "Skipping non-component reference");
                continue;
            };
            if seen.contains(&target) {
                continue;
            }
            let node = lookup(components, &target)
                .ok_or_else(|| AppError::ReferenceNotFound(reference.to_string()))?;
            seen.insert(target);
            queue.push_back(node);
        }
    }

    Ok(seen)
}

fn lookup<'a>(components: Option<&'a Value>, target: &ComponentRef) -> Option<&'a Value> {
    components?.get(&target.kind)?.get(&target.name)
}

/// Collects every `$ref` string under `value`, in traversal order.
fn collect_refs<'a>(value: &'a Value, refs: &mut IndexSet<&'a str>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("$ref", Value::String(s)) => {
                        refs.insert(s.as_str());
                    }
                    _ => collect_refs(child, refs),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_refs(v, refs)),
        _ => {}
    }
}

/// Collects scheme names from every `security` requirement array under `value`.
fn collect_security_schemes(value: &Value, names: &mut IndexSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "security" && child.is_array() {
                    collect_requirement_names(child, names);
                } else {
                    collect_security_schemes(child, names);
                }
            }
        }
        Value::Array(items) => items
            .iter()
            .for_each(|v| collect_security_schemes(v, names)),
        _ => {}
    }
}

fn collect_requirement_names(requirements: &Value, names: &mut IndexSet<String>) {
    let Some(list) = requirements.as_array() else {
        return;
    };
    for requirement in list.iter().filter_map(Value::as_object) {
        names.extend(requirement.keys().cloned());
    }
}

/// Copies the reachable components, keeping the source document's ordering
/// of sections and of entries within each section.
fn copy_components(document: &Value, reachable: &IndexSet<ComponentRef>) -> Map<String, Value> {
    let mut out = Map::new();
    let Some(sections) = document.get("components").and_then(Value::as_object) else {
        return out;
    };
    for (kind, entries) in sections {
        let Some(entries) = entries.as_object() else {
            continue;
        };
        let kept: Map<String, Value> = entries
            .iter()
            .filter(|(name, _)| {
                reachable.contains(&ComponentRef {
                    kind: kind.clone(),
                    name: (*name).clone(),
                })
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        if !kept.is_empty() {
            out.insert(kind.clone(), Value::Object(kept));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::document::parse_document;
    use crate::oas::refs::resolve;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const PETSTORE: &str = r##"
openapi: 3.0.3
info: { title: Pets, version: "1.0" }
servers:
  - url: https://api.example.com
security:
  - apiKey: []
paths:
  /pets:
    get:
      parameters:
        - $ref: "#/components/parameters/Limit"
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: array
                items: { $ref: "#/components/schemas/Pet" }
        default:
          $ref: "#/components/responses/Error"
  /owners:
    post:
      security:
        - oauth: [write]
      responses:
        "201":
          description: created
          content:
            application/json:
              schema: { $ref: "#/components/schemas/Owner" }
components:
  schemas:
    Owner:
      type: object
      properties:
        pets: { type: array, items: { $ref: "#/components/schemas/Pet" } }
    Pet:
      type: object
      properties:
        name: { type: string }
        tag: { $ref: "#/components/schemas/Tag" }
    Tag:
      type: string
    Unused:
      type: number
    Error:
      type: object
      properties:
        message: { type: string }
  parameters:
    Limit: { name: limit, in: query, schema: { type: integer } }
  responses:
    Error:
      description: failure
      content:
        application/json:
          schema: { $ref: "#/components/schemas/Error" }
  securitySchemes:
    apiKey: { type: apiKey, in: header, name: X-Key }
    oauth: { type: oauth2, flows: {} }
"##;

    fn petstore() -> Value {
        parse_document(PETSTORE).unwrap()
    }

    fn assert_self_contained(doc: &Value) {
        let mut refs = IndexSet::new();
        collect_refs(doc, &mut refs);
        for reference in refs {
            assert!(
                resolve(doc, reference).is_ok(),
                "dangling reference {reference}"
            );
        }
    }

    #[test]
    fn test_split_keeps_only_reachable_components() {
        let doc = petstore();
        let split = split_document(&doc).unwrap();
        assert_eq!(split.keys().collect::<Vec<_>>(), vec!["/pets", "/owners"]);

        let pets = &split["/pets"];
        let schemas: Vec<_> = pets["components"]["schemas"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        // Document order, not discovery order.
        assert_eq!(schemas, vec!["Pet", "Tag", "Error"]);
        assert!(pets["components"]["parameters"].get("Limit").is_some());
        assert!(pets["components"]["responses"].get("Error").is_some());
        assert_eq!(pets["paths"].as_object().unwrap().len(), 1);
        assert_eq!(pets["servers"][0]["url"], "https://api.example.com");
        assert_self_contained(pets);
    }

    #[test]
    fn test_split_collects_security_schemes() {
        let split = split_document(&petstore()).unwrap();
        let owners = &split["/owners"]["components"]["securitySchemes"];
        assert!(owners.get("oauth").is_some());
        // Document-level requirement applies to every path.
        assert!(owners.get("apiKey").is_some());
        let pets = &split["/pets"]["components"]["securitySchemes"];
        assert!(pets.get("oauth").is_none());
    }

    #[test]
    fn test_split_is_idempotent_and_non_destructive() {
        let doc = petstore();
        let before = doc.clone();
        let first = split_document(&doc).unwrap();
        let second = split_document(&doc).unwrap();
        assert_eq!(first, second);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_split_terminates_on_cycles() {
        let doc = json!({
            "openapi": "3.0.0",
            "paths": {
                "/a": {"get": {"responses": {"200": {
                    "description": "ok",
                    "content": {"application/json": {"schema": {"$ref": "#/components/schemas/A"}}}
                }}}}
            },
            "components": {"schemas": {
                "A": {"type": "object", "properties": {"b": {"$ref": "#/components/schemas/B"}}},
                "B": {"type": "object", "properties": {"a": {"$ref": "#/components/schemas/A"}}}
            }}
        });
        let split = split_document(&doc).unwrap();
        let schemas = split["/a"]["components"]["schemas"].as_object().unwrap();
        assert_eq!(schemas.len(), 2);
        assert!(schemas.contains_key("A") && schemas.contains_key("B"));
    }

    #[test]
    fn test_split_without_refs_omits_components() {
        let doc = json!({
            "openapi": "3.0.0",
            "paths": {"/ping": {"get": {"responses": {"204": {"description": "pong"}}}}},
            "components": {"schemas": {"X": {"type": "string"}}}
        });
        let split = split_document(&doc).unwrap();
        assert!(split["/ping"].get("components").is_none());
    }

    #[test]
    fn test_split_errors() {
        assert!(matches!(
            split_document(&json!({"openapi": "3.0.0"})),
            Err(AppError::InvalidSpec(_))
        ));

        let dangling = json!({
            "paths": {"/x": {"get": {"parameters": [{"$ref": "#/components/parameters/Nope"}]}}}
        });
        assert!(matches!(
            split_document(&dangling),
            Err(AppError::ReferenceNotFound(_))
        ));

        let remote = json!({
            "paths": {"/x": {"get": {"parameters": [{"$ref": "https://x.io/p.yaml#/P"}]}}}
        });
        assert!(matches!(
            split_document(&remote),
            Err(AppError::UnsupportedReferenceKind(_))
        ));
    }

    #[test]
    fn test_path_file_stem() {
        assert_eq!(path_file_stem("/hub/{id}"), "hub_{id}");
        assert_eq!(path_file_stem("/pets"), "pets");
        assert_eq!(path_file_stem("/"), "index");
    }
}
