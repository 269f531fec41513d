#![deny(missing_docs)]

//! # Parser Module
//!
//! Parses rendered JavaScript / TypeScript modules with `oxc_parser`.
//! The tree is only read; callers edit the original text by span.

use crate::error::{AppError, AppResult};
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_diagnostics::OxcDiagnostic;
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Parses `source` as a TypeScript module allocated in `allocator`.
///
/// # Errors
///
/// * `MalformedSource` with a `line:column` prefix for the first syntax
///   error the parser reports.
pub fn parse_program<'a>(allocator: &'a Allocator, source: &'a str) -> AppResult<Program<'a>> {
    let parsed = Parser::new(allocator, source, SourceType::ts()).parse();
    if let Some(diagnostic) = parsed.errors.first() {
        return Err(malformed(source, diagnostic));
    }
    if parsed.panicked {
        return Err(AppError::MalformedSource(
            "1:1: Unrecoverable syntax error".to_string(),
        ));
    }
    Ok(parsed.program)
}

fn malformed(source: &str, diagnostic: &OxcDiagnostic) -> AppError {
    let offset = diagnostic
        .labels
        .as_ref()
        .and_then(|labels| labels.first())
        .map_or(0, |label| label.offset());
    let (line, column) = position(source, offset);
    AppError::MalformedSource(format!("{}:{}: {}", line, column, diagnostic.message))
}

/// 1-based line and column of a byte offset.
pub fn position(source: &str, offset: usize) -> (usize, usize) {
    let prefix = source.get(..offset).unwrap_or(source);
    let line = prefix.matches('\n').count() + 1;
    let column = prefix
        .rsplit('\n')
        .next()
        .map_or(0, |current| current.chars().count())
        + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_ast::ast::Statement;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parses_typescript_modules() {
        let allocator = Allocator::default();
        let source = r#"
import { z } from "zod";
@sealed class Box<T> { constructor(private readonly value: T) {} }
export type Pet = z.infer<typeof petSchema>;
const petSchema = z.object({ "name": z.string() }) satisfies z.ZodTypeAny;
export { Box };
"#;
        let program = parse_program(&allocator, source).unwrap();
        assert_eq!(program.body.len(), 5);
        assert!(matches!(
            program.body[3],
            Statement::VariableDeclaration(_)
        ));
    }

    #[test]
    fn test_errors_carry_positions() {
        let allocator = Allocator::default();
        let error = parse_program(&allocator, "const a = 1;\nconst =;").unwrap_err();
        let AppError::MalformedSource(message) = &error else {
            panic!("unexpected error {:?}", error);
        };
        assert!(message.starts_with("2:"), "{}", message);
    }

    #[test]
    fn test_position() {
        assert_eq!(position("ab\ncd", 0), (1, 1));
        assert_eq!(position("ab\ncd", 4), (2, 2));
        assert_eq!(position("ab", 99), (1, 3));
    }
}
