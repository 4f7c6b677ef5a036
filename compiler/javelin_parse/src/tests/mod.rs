//! Parser integration tests.
//!
//! Helpers here parse whole units and navigate the arena; the submodules
//! cover expressions (precedence and disambiguation), declarations,
//! recovery behavior, and language-level gating.

mod exprs;
mod recovery;

use javelin_diagnostic::{CollectingSink, Diagnostic};
use javelin_ir::{Name, NodeId, SourceLevel, Tree};

use crate::{parse, ParseOutcome, ParserConfig};

pub(crate) fn parse_configured(
    source: &str,
    config: &ParserConfig,
) -> (ParseOutcome, Vec<Diagnostic>) {
    let mut sink = CollectingSink::new();
    let outcome = parse(source, config, &mut sink);
    (outcome, sink.into_vec())
}

pub(crate) fn parse_source(source: &str) -> (ParseOutcome, Vec<Diagnostic>) {
    parse_configured(source, &ParserConfig::default())
}

pub(crate) fn parse_at(source: &str, level: SourceLevel) -> (ParseOutcome, Vec<Diagnostic>) {
    parse_configured(
        source,
        &ParserConfig {
            level,
            ..ParserConfig::default()
        },
    )
}

/// Parse and require a clean run.
pub(crate) fn parse_clean(source: &str) -> ParseOutcome {
    let (outcome, diagnostics) = parse_source(source);
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics: {diagnostics:?}"
    );
    outcome
}

/// Type declarations of the unit.
pub(crate) fn unit_types(out: &ParseOutcome) -> Vec<NodeId> {
    match out.arena.kind(out.unit) {
        Tree::CompilationUnit { type_decls, .. } => out.arena.items(*type_decls).to_vec(),
        other => panic!("expected compilation unit, got {other:?}"),
    }
}

/// Members of the first type declaration.
pub(crate) fn first_class_members(out: &ParseOutcome) -> Vec<NodeId> {
    let types = unit_types(out);
    let first = *types.first().unwrap_or_else(|| panic!("no type declarations"));
    match out.arena.kind(first) {
        Tree::ClassDecl { members, .. } => out.arena.items(*members).to_vec(),
        other => panic!("expected class declaration, got {other:?}"),
    }
}

/// Body statements of the first method of the first type.
pub(crate) fn first_method_stats(out: &ParseOutcome) -> Vec<NodeId> {
    for member in first_class_members(out) {
        if let Tree::MethodDecl { body: Some(body), .. } = out.arena.kind(member) {
            if let Tree::Block { stats, .. } = out.arena.kind(*body) {
                return out.arena.items(*stats).to_vec();
            }
        }
    }
    panic!("no method with a body");
}

/// The expression of the first expression statement in the first method,
/// for sources shaped `class T {{ void m() {{ <expr>; }} }}`.
pub(crate) fn first_expr(out: &ParseOutcome) -> NodeId {
    let stats = first_method_stats(out);
    let first = *stats.first().unwrap_or_else(|| panic!("no statements"));
    match out.arena.kind(first) {
        Tree::ExprStatement { expr } => *expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

/// Parse `expr` inside a method body and return its node.
pub(crate) fn parse_expr_clean(expr: &str) -> (ParseOutcome, NodeId) {
    let source = format!("class T {{ void m() {{ {expr}; }} }}");
    let out = parse_clean(&source);
    let id = first_expr(&out);
    (out, id)
}

/// Spelling of an interned name.
pub(crate) fn spelling(out: &ParseOutcome, name: Name) -> String {
    out.names.lookup(name).to_owned()
}
