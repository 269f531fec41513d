#![deny(missing_docs)]

//! # OpenAPI Document Module
//!
//! - **document**: Loading and operation enumeration.
//! - **models**: Typed views over raw schema / parameter nodes.
//! - **refs**: Local `$ref` resolution and binding names.
//! - **splitter**: Per-path tree-shaking.

pub mod document;
pub mod models;
pub mod refs;
pub mod splitter;

pub use document::{operations, parse_document, OperationEntry, HTTP_METHODS};
pub use refs::{name_from_ref, resolve};
pub use splitter::{path_file_stem, split_document};
