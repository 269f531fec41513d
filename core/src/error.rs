//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// A `$ref` that is not a local `#/...` pointer.
    #[from(ignore)]
    #[display("Unsupported reference kind: {_0}")]
    UnsupportedReferenceKind(String),

    /// A local pointer that does not resolve inside the document.
    #[from(ignore)]
    #[display("Reference not found: {_0}")]
    ReferenceNotFound(String),

    /// A pointer with no usable trailing segment.
    #[from(ignore)]
    #[display("Invalid reference: {_0}")]
    InvalidReference(String),

    /// A chain of `$ref`s that loops back on itself without a schema boundary.
    #[from(ignore)]
    #[display("Circular reference: {_0}")]
    CircularReference(String),

    /// The document is not a usable OpenAPI description.
    #[from(ignore)]
    #[display("Invalid OpenAPI document: {_0}")]
    InvalidSpec(String),

    /// A `oneOf` + `discriminator` that cannot be expressed as a tagged union.
    #[from(ignore)]
    #[display("Invalid discriminated union: {_0}")]
    InvalidDiscriminatedUnion(String),

    /// An `enum` on a string schema that is not a non-empty list of strings.
    #[from(ignore)]
    #[display("Invalid enum: {_0}")]
    InvalidEnum(String),

    /// An array schema without `items`.
    #[from(ignore)]
    #[display("Array schema without items: {_0}")]
    MissingArrayItems(String),

    /// A parameter without a `schema`.
    #[from(ignore)]
    #[display("Parameter without schema: {_0}")]
    MissingParameterSchema(String),

    /// An operation with no declared responses.
    #[from(ignore)]
    #[display("No responses defined: {_0}")]
    NoResponsesDefined(String),

    /// A response key that is neither a status code, a status range nor `default`.
    #[from(ignore)]
    #[display("Unsupported status code: {_0}")]
    UnsupportedStatusCode(String),

    /// Coercion applied to something other than a number or boolean.
    #[from(ignore)]
    #[display("Unsupported coercion: {_0}")]
    UnsupportedCoercion(String),

    /// A composition node that cannot be rendered (e.g. an empty merge).
    #[from(ignore)]
    #[display("Invalid composition: {_0}")]
    InvalidComposition(String),

    /// A component whose binding name is taken by another component or by a
    /// module export.
    #[from(ignore)]
    #[display("Binding name collision: {_0}")]
    BindingCollision(String),

    /// Source text the eliminator could not parse.
    #[from(ignore)]
    #[display("Malformed source: {_0}")]
    MalformedSource(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
