#![deny(missing_docs)]

//! # Dead-Code Eliminator
//!
//! Drops top-level bindings of a rendered module that nothing kept can reach.
//! Only removable declarations are edited; every other byte of the source is
//! copied through unchanged.

pub mod liveness;

pub use liveness::{analyze, removable, Binding, Liveness};

use crate::error::AppResult;
use crate::parser::parse_program;
use oxc_allocator::Allocator;
use oxc_span::Span;
use std::ops::Range;
use tracing::debug;

/// Removes dead top-level `var` / `let` / `const` declarators from `source`.
///
/// A declaration whose declarators are all dead is deleted together with its
/// line when it sits on a line of its own. A partially dead declaration is
/// rewritten to keep only the live declarators.
///
/// # Errors
///
/// * `MalformedSource` if `source` does not parse.
pub fn eliminate(source: &str) -> AppResult<String> {
    let allocator = Allocator::default();
    let program = parse_program(&allocator, source)?;
    let liveness = analyze(&program);

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    let mut removed = 0;
    for (index, statement) in program.body.iter().enumerate() {
        let Some(declaration) = removable(statement) else {
            continue;
        };
        let flags = liveness.declarators(index);
        if flags.iter().all(|live| *live) {
            continue;
        }
        removed += flags.iter().filter(|live| !**live).count();

        let (range, replacement) = if flags.iter().all(|live| !*live) {
            (removal_range(source, declaration.span), String::new())
        } else {
            let kept: Vec<&str> = declaration
                .declarations
                .iter()
                .zip(&flags)
                .filter(|(_, live)| **live)
                .map(|(declarator, _)| &source[byte_range(declarator.span)])
                .collect();
            let rewritten = format!("{} {};", declaration.kind.as_str(), kept.join(", "));
            (byte_range(declaration.span), rewritten)
        };

        let start = range.start.max(cursor);
        output.push_str(&source[cursor..start]);
        output.push_str(&replacement);
        cursor = range.end;
    }
    output.push_str(&source[cursor..]);

    debug!(removed, "Eliminated dead bindings");
    Ok(output)
}

fn byte_range(span: Span) -> Range<usize> {
    span.start as usize..span.end as usize
}

/// Widens a statement span to swallow its own line: leading indentation,
/// the line break after it and any blank lines that follow. A statement
/// sharing its line with other code only loses adjacent spaces.
fn removal_range(source: &str, span: Span) -> Range<usize> {
    let Range { start, end } = byte_range(span);
    let line_start = source[..start].rfind('\n').map_or(0, |nl| nl + 1);
    let leading_blank = source[line_start..start].trim().is_empty();

    let rest = &source[end..];
    let line_end = rest.find('\n').map_or(source.len(), |nl| end + nl + 1);
    let trailing_blank = source[end..line_end].trim().is_empty();

    if leading_blank && trailing_blank {
        let mut cut = line_end;
        while cut < source.len() {
            let next = source[cut..]
                .find('\n')
                .map_or(source.len(), |nl| cut + nl + 1);
            if !source[cut..next].trim().is_empty() {
                break;
            }
            cut = next;
        }
        return line_start..cut;
    }

    let spaces = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    start..end + spaces
}
