//! # Liveness
//!
//! Decides which top-level bindings a module still needs.
//!
//! Removable bindings are the declarators of top-level, non-exported `var`,
//! `let` and `const` statements. Every other top-level statement is kept, so
//! the module-level symbols it references are seeds. A removable binding is
//! live when a seed or another live binding references one of its names,
//! directly or from inside a deferred function such as `z.lazy(() => name)`.
//!
//! Scopes, hoisting and shadowing come from `oxc_semantic`: only references
//! that resolve to a root-scope symbol take part.

use indexmap::IndexSet;
use oxc_ast::ast::{Program, Statement, VariableDeclaration, VariableDeclarationKind};
use oxc_semantic::SemanticBuilder;
use oxc_span::{GetSpan, Span};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// One removable declarator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Index of the declaring statement in the program body.
    pub statement: usize,
    /// Index of the declarator within that statement.
    pub declarator: usize,
    /// Source range of the declarator.
    pub span: Span,
    /// Names bound by the declarator's pattern, in source order.
    pub names: Vec<String>,
    /// Module-level names referenced from inside the declarator.
    pub references: IndexSet<String>,
    /// Reachable from a seed.
    pub live: bool,
}

/// Result of [`analyze`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Liveness {
    /// Module-level names referenced by kept statements, in declaration order.
    pub seeds: IndexSet<String>,
    /// Removable bindings in source order.
    pub bindings: Vec<Binding>,
}

impl Liveness {
    /// Liveness flags for the declarators of statement `index`, in source
    /// order. Empty when the statement is not removable.
    pub fn declarators(&self, index: usize) -> Vec<bool> {
        self.bindings
            .iter()
            .filter(|b| b.statement == index)
            .map(|b| b.live)
            .collect()
    }

    /// Whether a removable binding declares `name` and is live.
    pub fn is_live(&self, name: &str) -> bool {
        self.bindings
            .iter()
            .any(|b| b.live && b.names.iter().any(|n| n == name))
    }

    /// Index of the binding whose declarator contains `span`.
    fn owner(&self, span: Span) -> Option<usize> {
        let after = self
            .bindings
            .partition_point(|binding| binding.span.start <= span.start);
        let index = after.checked_sub(1)?;
        (span.end <= self.bindings[index].span.end).then_some(index)
    }
}

/// The top-level declaration a dead declarator may be cut from.
///
/// Exported, ambient (`declare`) and `using` declarations are never removable.
pub fn removable<'s, 'a>(statement: &'s Statement<'a>) -> Option<&'s VariableDeclaration<'a>> {
    match statement {
        Statement::VariableDeclaration(declaration)
            if !declaration.declare
                && matches!(
                    declaration.kind,
                    VariableDeclarationKind::Var
                        | VariableDeclarationKind::Let
                        | VariableDeclarationKind::Const
                ) =>
        {
            Some(&**declaration)
        }
        _ => None,
    }
}

/// Computes seeds, the reference graph and its fixed point.
pub fn analyze(program: &Program<'_>) -> Liveness {
    let mut liveness = Liveness::default();
    for (index, statement) in program.body.iter().enumerate() {
        let Some(declaration) = removable(statement) else {
            continue;
        };
        for (position, declarator) in declaration.declarations.iter().enumerate() {
            liveness.bindings.push(Binding {
                statement: index,
                declarator: position,
                span: declarator.span,
                names: Vec::new(),
                references: IndexSet::new(),
                live: false,
            });
        }
    }

    let semantic = SemanticBuilder::new().build(program).semantic;
    let scoping = semantic.scoping();
    let nodes = semantic.nodes();

    let mut symbols: Vec<_> = scoping.iter_bindings_in(scoping.root_scope_id()).collect();
    symbols.sort_by_key(|&symbol| scoping.symbol_span(symbol).start);

    for &symbol in &symbols {
        let name = scoping.symbol_name(symbol);
        if let Some(index) = liveness.owner(scoping.symbol_span(symbol)) {
            liveness.bindings[index].names.push(name.to_string());
        }
    }
    for &symbol in &symbols {
        let name = scoping.symbol_name(symbol);
        for reference in scoping.get_resolved_references(symbol) {
            let span = nodes.kind(reference.node_id()).span();
            match liveness.owner(span) {
                Some(index) => {
                    liveness.bindings[index].references.insert(name.to_string());
                }
                None => {
                    liveness.seeds.insert(name.to_string());
                }
            }
        }
    }

    let mut declared_by: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, binding) in liveness.bindings.iter().enumerate() {
        for name in &binding.names {
            declared_by.entry(name.as_str()).or_default().push(index);
        }
    }

    let mut marked = vec![false; liveness.bindings.len()];
    let mut queue: VecDeque<&str> = liveness.seeds.iter().map(String::as_str).collect();
    while let Some(name) = queue.pop_front() {
        for &index in declared_by.get(name).into_iter().flatten() {
            if !marked[index] {
                marked[index] = true;
                queue.extend(liveness.bindings[index].references.iter().map(String::as_str));
            }
        }
    }
    for (binding, live) in liveness.bindings.iter_mut().zip(marked) {
        binding.live = live;
    }

    debug!(
        seeds = liveness.seeds.len(),
        bindings = liveness.bindings.len(),
        live = liveness.bindings.iter().filter(|b| b.live).count(),
        "Computed liveness"
    );
    liveness
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_program;
    use oxc_allocator::Allocator;
    use pretty_assertions::assert_eq;

    fn liveness(source: &str) -> Liveness {
        let allocator = Allocator::default();
        let program = parse_program(&allocator, source).unwrap();
        analyze(&program)
    }

    fn seeds(source: &str) -> Vec<String> {
        liveness(source).seeds.into_iter().collect()
    }

    #[test]
    fn test_seeds_from_kept_statements() {
        let source = r#"
import { z } from "zod";
const a = 1;
const b = 2, c = 3;
console.log(a);
export { b, c as d };
export { e } from "./e";
export const f = [z.lazy(() => g)];
const g = z.string();
export default h;
function h() {}
"#;
        assert_eq!(seeds(source), vec!["z", "a", "b", "c", "g", "h"]);
    }

    #[test]
    fn test_shadowing_is_respected() {
        let source = r#"
const a = 1, b = 2, d = 3, x = 4, y = 5, err = 6;
function f(a, { b = c }) { const d = 1; return a + b + d + e; }
const g = (x) => { let y; try { y = x; } catch (err) { return err; } return y + w; };
for (const i of items) { use(i); }
class K { m(k) { return k + this.v; } }
const w = 7;
"#;
        assert!(seeds(source).is_empty());
        let liveness = liveness(source);
        assert!(!liveness.is_live("a"));
        let g = liveness
            .bindings
            .iter()
            .find(|b| b.names == ["g"])
            .unwrap();
        assert_eq!(g.references.iter().collect::<Vec<_>>(), vec!["w"]);
    }

    #[test]
    fn test_hoisted_functions_reference_bindings() {
        let source = "export { run };\nfunction run() { return helper; }\nconst helper = 1;\n";
        let liveness = liveness(source);
        assert_eq!(liveness.seeds.iter().collect::<Vec<_>>(), vec!["run", "helper"]);
        assert!(liveness.is_live("helper"));
    }

    #[test]
    fn test_fixed_point_over_cycles() {
        let source = r#"
const a = z.object({ b: z.lazy(() => b) });
const b = z.object({ a: z.lazy(() => a) });
const c = z.lazy(() => d), d = z.lazy(() => c);
export { a };
"#;
        let liveness = liveness(source);
        assert!(liveness.is_live("a"));
        assert!(liveness.is_live("b"));
        assert!(!liveness.is_live("c"));
        assert!(!liveness.is_live("d"));
        assert_eq!(liveness.declarators(0), vec![true]);
        assert_eq!(liveness.declarators(2), vec![false, false]);
        assert!(liveness.declarators(3).is_empty());
    }

    #[test]
    fn test_destructuring_binds_every_name() {
        let source = r#"
const { x, y: [z1, ...rest] } = source;
const unused = 1;
log(rest);
"#;
        let liveness = liveness(source);
        assert_eq!(liveness.bindings[0].names, vec!["x", "z1", "rest"]);
        assert!(liveness.bindings[0].live);
        assert!(!liveness.bindings[1].live);
    }

    #[test]
    fn test_type_references_keep_bindings() {
        let source = "const petSchema = z.object({});\nexport type Pet = z.infer<typeof petSchema>;\n";
        assert!(liveness(source).is_live("petSchema"));
    }
}
