#![deny(missing_docs)]

//! # oas2zod Core
//!
//! Compiles OpenAPI 3.0 documents into Zod validator modules.
//!
//! The pipeline is: load ([`oas::parse_document`]), optionally split per path
//! ([`oas::split_document`]), compile schemas and operations ([`zod`]), render
//! TypeScript source and finally drop unreachable bindings ([`prune`]).

/// Shared error types.
pub mod error;

/// OpenAPI document loading, reference resolution and splitting.
pub mod oas;

/// Zod validator compilation and rendering.
pub mod zod;

/// JavaScript / TypeScript module parsing.
pub mod parser;

/// Dead-code elimination over rendered modules.
pub mod prune;

pub use error::{AppError, AppResult};
pub use oas::{name_from_ref, parse_document, path_file_stem, resolve, split_document};
pub use parser::parse_program;
pub use prune::eliminate;
pub use zod::{
    compile_module, compile_operation, render, transform_document, transform_paths,
    CompiledModule, CompiledOperation, GenerateOptions, SchemaCompiler, ZodAst, ZodKind,
};
