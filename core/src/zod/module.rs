#![deny(missing_docs)]

//! # Module Assembly
//!
//! Compiles a whole document into the top-level binding set and renders it
//! as one TypeScript module: component schemas first, then the request and
//! response validators.

use crate::error::{AppError, AppResult};
use crate::oas::document::{operations, paths};
use crate::oas::refs::{name_from_ref, pointer_for_component};
use crate::oas::splitter::split_document;
use crate::prune::eliminate;
use crate::zod::ast::ZodAst;
use crate::zod::operation::{compile_operation, CompiledOperation};
use crate::zod::render::render;
use crate::zod::schema::{CompileOptions, SchemaCompiler};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Names every rendered module declares besides its component bindings.
pub const RESERVED_BINDINGS: &[&str] = &[
    "z",
    "requestSchema",
    "responseSchema",
    "requestSchemas",
    "responseSchemas",
];

/// Output settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Emit component bindings as `export const` instead of `const`.
    pub export_components: bool,
    /// Run dead-code elimination over the rendered module.
    pub prune: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            export_components: false,
            prune: true,
        }
    }
}

/// The binding set of one compilation run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledModule {
    /// Component schema bindings, in document order.
    pub components: IndexMap<String, ZodAst>,
    /// Request / response pairs, in document order.
    pub operations: Vec<CompiledOperation>,
}

/// Compiles every component schema and every operation of `document`.
///
/// # Errors
///
/// * `InvalidSpec` if the document has no `paths` object.
/// * `BindingCollision` if a component's binding name is reserved or already
///   taken by an earlier component (`Pet` and `pet` are both `petSchema`).
/// * Any schema, operation or reference error.
pub fn compile_module(document: &Value) -> AppResult<CompiledModule> {
    paths(document)?;
    let mut compiler = SchemaCompiler::new(document);

    let mut components = IndexMap::new();
    let mut owners: IndexMap<String, &str> = IndexMap::new();
    let schemas = document
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_object);
    for (name, schema) in schemas.into_iter().flatten() {
        let binding = name_from_ref(&pointer_for_component("schemas", name))?;
        if RESERVED_BINDINGS.contains(&binding.as_str()) {
            return Err(AppError::BindingCollision(format!(
                "component `{}` renders as `{}`, which the module exports",
                name, binding
            )));
        }
        if let Some(previous) = owners.insert(binding.clone(), name) {
            return Err(AppError::BindingCollision(format!(
                "components `{}` and `{}` both render as `{}`",
                previous, name, binding
            )));
        }
        let ast = compiler.compile(schema, CompileOptions::default())?;
        components.insert(binding, ast);
    }

    let mut compiled = Vec::new();
    for entry in operations(document)? {
        compiled.extend(compile_operation(&mut compiler, &entry)?);
    }

    info!(
        components = components.len(),
        operations = compiled.len(),
        "Compiled module"
    );
    Ok(CompiledModule {
        components,
        operations: compiled,
    })
}

impl CompiledModule {
    /// Renders the module source.
    ///
    /// Exactly one operation is exported as `requestSchema` / `responseSchema`;
    /// any other count as the parallel arrays `requestSchemas` / `responseSchemas`.
    pub fn render(&self, options: &GenerateOptions) -> AppResult<String> {
        let mut sections = vec!["import { z } from \"zod\";".to_string()];

        let keyword = if options.export_components {
            "export const"
        } else {
            "const"
        };
        for (name, ast) in &self.components {
            sections.push(format!("{} {} = {};", keyword, name, render(ast)?));
        }

        if let [single] = self.operations.as_slice() {
            sections.push(format!(
                "export const requestSchema = {};",
                render(&single.request)?
            ));
            sections.push(format!(
                "export const responseSchema = {};",
                render(&single.response)?
            ));
        } else {
            let requests = self.operations.iter().map(|op| &op.request);
            let responses = self.operations.iter().map(|op| &op.response);
            sections.push(render_array("requestSchemas", requests)?);
            sections.push(render_array("responseSchemas", responses)?);
        }

        let mut source = sections.join("\n\n");
        source.push('\n');
        Ok(source)
    }
}

fn render_array<'a>(name: &str, items: impl Iterator<Item = &'a ZodAst>) -> AppResult<String> {
    let rendered = items.map(render).collect::<AppResult<Vec<_>>>()?;
    if rendered.is_empty() {
        return Ok(format!("export const {} = [];", name));
    }
    Ok(format!(
        "export const {} = [\n  {}\n];",
        name,
        rendered.join(",\n  ")
    ))
}

/// Compiles, renders and (optionally) prunes a whole document.
pub fn transform_document(document: &Value, options: &GenerateOptions) -> AppResult<String> {
    let source = compile_module(document)?.render(options)?;
    if options.prune {
        eliminate(&source)
    } else {
        Ok(source)
    }
}

/// Splits `document` per path and transforms each sub-document.
///
/// Keys are path templates in document order.
pub fn transform_paths(
    document: &Value,
    options: &GenerateOptions,
) -> AppResult<IndexMap<String, String>> {
    split_document(document)?
        .into_iter()
        .map(|(path, sub)| -> AppResult<(String, String)> {
            Ok((path, transform_document(&sub, options)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::document::parse_document;
    use pretty_assertions::assert_eq;

    const PETS: &str = r##"
openapi: 3.0.0
info: { title: Pets, version: "1" }
paths:
  /pets:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: { type: array, items: { $ref: "#/components/schemas/Pet" } }
components:
  schemas:
    Pet:
      type: object
      properties:
        name: { type: string }
        owner: { $ref: "#/components/schemas/Owner" }
      required: [name]
    Owner:
      type: object
      properties:
        pets: { type: array, items: { $ref: "#/components/schemas/Pet" } }
    Orphan:
      type: string
"##;

    #[test]
    fn test_compile_module_collects_bindings() {
        let doc = parse_document(PETS).unwrap();
        let module = compile_module(&doc).unwrap();
        let names: Vec<_> = module.components.keys().cloned().collect();
        assert_eq!(names, vec!["petSchema", "ownerSchema", "orphanSchema"]);
        assert_eq!(module.operations.len(), 1);
    }

    #[test]
    fn test_render_single_operation() {
        let doc = parse_document(PETS).unwrap();
        let source = compile_module(&doc)
            .unwrap()
            .render(&GenerateOptions {
                export_components: false,
                prune: false,
            })
            .unwrap();
        let expected = concat!(
            "import { z } from \"zod\";\n\n",
            "const petSchema = z.object({ \"name\": z.string(), \"owner\": z.lazy(() => ownerSchema).optional() });\n\n",
            "const ownerSchema = z.object({ \"pets\": z.array(z.lazy(() => petSchema)).optional() });\n\n",
            "const orphanSchema = z.string();\n\n",
            "export const requestSchema = z.object({ \"method\": z.literal(\"get\"), \"path\": z.object({}).optional().default({}), \"query\": z.object({}).optional().default({}), \"body\": z.undefined() });\n\n",
            "export const responseSchema = z.object({ \"status\": z.literal(200), \"headers\": z.object({}).describe(\"Response headers\"), \"body\": z.array(z.lazy(() => petSchema)) });\n",
        );
        assert_eq!(source, expected);
    }

    #[test]
    fn test_transform_prunes_unreachable_components() {
        let doc = parse_document(PETS).unwrap();
        let source = transform_document(&doc, &GenerateOptions::default()).unwrap();
        assert!(source.contains("const petSchema"));
        // Reachable only through the Pet <-> Owner cycle.
        assert!(source.contains("const ownerSchema"));
        assert!(!source.contains("orphanSchema"));
    }

    #[test]
    fn test_exported_components_survive_pruning() {
        let doc = parse_document(PETS).unwrap();
        let options = GenerateOptions {
            export_components: true,
            prune: true,
        };
        let source = transform_document(&doc, &options).unwrap();
        assert!(source.contains("export const orphanSchema = z.string();"));
    }

    #[test]
    fn test_multiple_operations_render_arrays() {
        let yaml = r#"
openapi: 3.0.0
paths:
  /a:
    get: { responses: { "200": { description: ok } } }
    post: { responses: { "201": { description: created } } }
"#;
        let doc = parse_document(yaml).unwrap();
        let source = compile_module(&doc)
            .unwrap()
            .render(&GenerateOptions::default())
            .unwrap();
        assert!(source.contains("export const requestSchemas = [\n  z.object({ \"method\": z.literal(\"get\")"));
        assert!(source.contains("export const responseSchemas = [\n  z.object({ \"status\": z.literal(200)"));
        assert!(source.contains(",\n  z.object({ \"status\": z.literal(201)"));
    }

    #[test]
    fn test_transform_paths() {
        let doc = parse_document(PETS).unwrap();
        let modules = transform_paths(&doc, &GenerateOptions::default()).unwrap();
        assert_eq!(modules.len(), 1);
        let pets = &modules["/pets"];
        assert!(pets.contains("export const responseSchema"));
        assert!(!pets.contains("orphanSchema"));
    }

    #[test]
    fn test_components_cannot_shadow_exports() {
        let yaml = r#"
openapi: 3.0.0
paths:
  /a:
    get: { responses: { "200": { description: ok } } }
components:
  schemas:
    Request: { type: string }
"#;
        let doc = parse_document(yaml).unwrap();
        match compile_module(&doc) {
            Err(AppError::BindingCollision(message)) => assert_eq!(
                message,
                "component `Request` renders as `requestSchema`, which the module exports"
            ),
            other => panic!("unexpected result {:?}", other),
        }

        let doc = parse_document(&yaml.replace("Request:", "Response:")).unwrap();
        assert!(matches!(
            compile_module(&doc),
            Err(AppError::BindingCollision(_))
        ));
    }

    #[test]
    fn test_components_with_one_binding_name_collide() {
        let yaml = r#"
openapi: 3.0.0
paths:
  /a:
    get: { responses: { "200": { description: ok } } }
components:
  schemas:
    Pet: { type: string }
    pet: { type: integer }
"#;
        let doc = parse_document(yaml).unwrap();
        let error = compile_module(&doc).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Binding name collision: components `Pet` and `pet` both render as `petSchema`"
        );
    }

    #[test]
    fn test_missing_paths() {
        let doc = serde_json::json!({"openapi": "3.0.0"});
        assert!(matches!(compile_module(&doc), Err(AppError::InvalidSpec(_))));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: GenerateOptions = serde_json::from_str(r#"{"export_components": true}"#).unwrap();
        assert!(options.export_components);
        assert!(options.prune);
    }
}
