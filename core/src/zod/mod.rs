#![deny(missing_docs)]

//! # Zod Code Generation
//!
//! - **ast**: Validator AST.
//! - **schema**: Schema Object lowering.
//! - **operation**: Request / response validators per operation.
//! - **render**: AST to TypeScript source.
//! - **module**: Whole-document binding set and module output.

pub mod ast;
pub mod module;
pub mod operation;
pub mod render;
pub mod schema;

pub use ast::{ObjectShape, ZodAst, ZodKind};
pub use module::{compile_module, transform_document, transform_paths, CompiledModule, GenerateOptions};
pub use operation::{compile_operation, CompiledOperation};
pub use render::render;
pub use schema::{CompileOptions, SchemaCompiler};
