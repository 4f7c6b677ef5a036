//! Error recovery: one diagnostic per offset, placeholder nodes, forward
//! progress on arbitrary garbage.

use javelin_ir::Tree;
use pretty_assertions::assert_eq;

use super::{first_class_members, first_method_stats, parse_source, unit_types};

#[test]
fn missing_close_paren_in_if() {
    let (out, diagnostics) = parse_source("class T { void m() { if (a > b { } } }");
    assert_eq!(
        diagnostics.len(),
        1,
        "expected exactly one diagnostic: {diagnostics:?}"
    );
    // the tree still carries a complete block-bodied if
    let stats = first_method_stats(&out);
    let Tree::If { then_stat, .. } = out.arena.kind(stats[0]) else {
        panic!("expected if statement, got {:?}", out.arena.kind(stats[0]));
    };
    assert!(matches!(out.arena.kind(*then_stat), Tree::Block { .. }));
}

#[test]
fn missing_initializer_expression() {
    let (out, diagnostics) = parse_source("class A { int x = ; }");
    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
    let members = first_class_members(&out);
    let Tree::VarDecl { init: Some(init), .. } = out.arena.kind(members[0]) else {
        panic!("expected field with initializer");
    };
    assert!(matches!(out.arena.kind(*init), Tree::Erroneous { .. }));
}

#[test]
fn missing_semicolon_between_statements() {
    let (out, diagnostics) = parse_source("class T { void m() { int a = 1 int b = 2; } }");
    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
    assert_eq!(first_method_stats(&out).len(), 2);
}

#[test]
fn at_most_one_diagnostic_per_offset() {
    let (_out, diagnostics) = parse_source("class T { void m() { x = = 5; } }");
    let positions: Vec<u32> = diagnostics.iter().map(|d| d.span.start).collect();
    let mut deduped = positions.clone();
    deduped.dedup();
    assert_eq!(positions, deduped, "duplicate diagnostics at one offset");
}

#[test]
fn garbage_member_makes_progress() {
    // nothing here is a member; the parser must terminate and keep the
    // class declaration
    let (out, diagnostics) = parse_source("class A { ??? !! }");
    assert!(!diagnostics.is_empty());
    let types = unit_types(&out);
    assert!(matches!(out.arena.kind(types[0]), Tree::ClassDecl { .. }));
}

#[test]
fn premature_end_of_input() {
    let (out, diagnostics) = parse_source("class A { void m(");
    assert!(
        diagnostics
            .iter()
            .any(|d| d.code == javelin_diagnostic::ErrorCode::E1005),
        "{diagnostics:?}"
    );
    // the class and method still appear in the tree
    let members = first_class_members(&out);
    assert!(matches!(out.arena.kind(members[0]), Tree::MethodDecl { .. }));
}

#[test]
fn else_without_if() {
    let (out, diagnostics) = parse_source("class T { void m() { else { } } }");
    assert!(diagnostics
        .iter()
        .any(|d| d.code == javelin_diagnostic::ErrorCode::E1013));
    let stats = first_method_stats(&out);
    assert!(matches!(out.arena.kind(stats[0]), Tree::Erroneous { .. }));
}

#[test]
fn top_level_garbage_recovers_to_next_class() {
    let (out, diagnostics) = parse_source("???\nclass A { }");
    assert!(!diagnostics.is_empty());
    let types = unit_types(&out);
    assert!(types
        .iter()
        .any(|t| matches!(out.arena.kind(*t), Tree::ClassDecl { .. })));
}

#[test]
fn erroneous_nodes_preserve_partial_structure() {
    // `class` with a name but bad body member: the member becomes an
    // erroneous node wrapping what was parsed
    let (out, diagnostics) = parse_source("class A { int }");
    assert!(!diagnostics.is_empty());
    let members = first_class_members(&out);
    assert!(!members.is_empty());
}

#[test]
fn unclosed_string_is_single_lexical_error() {
    let (_out, diagnostics) = parse_source("class T { String s = \"oops; }");
    let lexical: Vec<_> = diagnostics.iter().filter(|d| d.code.is_lexical()).collect();
    assert_eq!(lexical.len(), 1, "{diagnostics:?}");
}
