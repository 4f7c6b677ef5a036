//! Expression precedence and disambiguation.

use javelin_ir::{BinaryOp, Literal, RefMode, Tree, UnaryOp};
use pretty_assertions::assert_eq;

use super::{first_expr, first_method_stats, parse_clean, parse_expr_clean, parse_source, spelling};
use crate::ParserConfig;

#[test]
fn assignment_is_outermost_ternary_next() {
    let (out, expr) = parse_expr_clean("a = b ? c : d + e * f");
    let Tree::Assign { target, value } = out.arena.kind(expr) else {
        panic!("expected assignment at the root, got {:?}", out.arena.kind(expr));
    };
    assert!(matches!(out.arena.kind(*target), Tree::Ident { .. }));
    let Tree::Conditional { else_expr, .. } = out.arena.kind(*value) else {
        panic!("expected conditional as assignment value");
    };
    // d + e * f: multiplication strictly inside addition
    let Tree::Binary {
        op: BinaryOp::Add,
        rhs,
        ..
    } = out.arena.kind(*else_expr)
    else {
        panic!("expected addition in the else branch");
    };
    assert!(matches!(
        out.arena.kind(*rhs),
        Tree::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn left_associative_same_precedence() {
    let (out, expr) = parse_expr_clean("x = a - b - c");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    // (a - b) - c
    let Tree::Binary {
        op: BinaryOp::Sub,
        lhs,
        rhs,
    } = out.arena.kind(*value)
    else {
        panic!("expected subtraction");
    };
    assert!(matches!(
        out.arena.kind(*lhs),
        Tree::Binary {
            op: BinaryOp::Sub,
            ..
        }
    ));
    assert!(matches!(out.arena.kind(*rhs), Tree::Ident { .. }));
}

#[test]
fn instanceof_binds_tighter_than_logical_and() {
    let (out, expr) = parse_expr_clean("r = x instanceof List && y");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::Binary {
        op: BinaryOp::And,
        lhs,
        ..
    } = out.arena.kind(*value)
    else {
        panic!("expected && at the top");
    };
    assert!(matches!(out.arena.kind(*lhs), Tree::InstanceOf { .. }));
}

#[test]
fn cast_of_identifier_type() {
    let (out, expr) = parse_expr_clean("y = (Widget) x");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::TypeCast { cast_type, expr } = out.arena.kind(*value) else {
        panic!("expected cast, got {:?}", out.arena.kind(*value));
    };
    assert!(matches!(out.arena.kind(*cast_type), Tree::Ident { .. }));
    assert!(matches!(out.arena.kind(*expr), Tree::Ident { .. }));
}

#[test]
fn parenthesized_expression_statement() {
    let (out, expr) = parse_expr_clean("(x)");
    assert!(matches!(out.arena.kind(expr), Tree::Paren { .. }));
}

#[test]
fn implicit_lambda_single_param() {
    let (out, expr) = parse_expr_clean("f = (x) -> x");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::Lambda {
        params,
        explicit_params,
        ..
    } = out.arena.kind(*value)
    else {
        panic!("expected lambda, got {:?}", out.arena.kind(*value));
    };
    assert!(!explicit_params);
    assert_eq!(out.arena.items(*params).len(), 1);
}

#[test]
fn explicit_lambda_typed_param() {
    let (out, expr) = parse_expr_clean("f = (int x) -> x");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::Lambda {
        params,
        explicit_params,
        ..
    } = out.arena.kind(*value)
    else {
        panic!("expected lambda");
    };
    assert!(explicit_params);
    let param = out.arena.items(*params)[0];
    assert!(matches!(
        out.arena.kind(param),
        Tree::VarDecl {
            var_type: Some(_),
            ..
        }
    ));
}

#[test]
fn implicit_lambda_two_params() {
    let (out, expr) = parse_expr_clean("f = (a, b) -> a");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::Lambda { params, .. } = out.arena.kind(*value) else {
        panic!("expected lambda");
    };
    assert_eq!(out.arena.items(*params).len(), 2);
}

#[test]
fn bare_parameter_lambda() {
    let (out, expr) = parse_expr_clean("f = x -> x");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    assert!(matches!(out.arena.kind(*value), Tree::Lambda { .. }));
}

#[test]
fn lambda_with_block_body() {
    let (out, expr) = parse_expr_clean("f = () -> { return 1; }");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::Lambda { body, params, .. } = out.arena.kind(*value) else {
        panic!("expected lambda");
    };
    assert!(out.arena.items(*params).is_empty());
    assert!(matches!(out.arena.kind(*body), Tree::Block { .. }));
}

#[test]
fn bound_method_reference() {
    let (out, expr) = parse_expr_clean("f = String::valueOf");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::MemberRef { mode, name, .. } = out.arena.kind(*value) else {
        panic!("expected method reference, got {:?}", out.arena.kind(*value));
    };
    assert_eq!(*mode, RefMode::Invoke);
    assert_eq!(spelling(&out, *name), "valueOf");
}

#[test]
fn constructor_reference() {
    let (out, expr) = parse_expr_clean("f = Widget::new");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::MemberRef { mode, .. } = out.arena.kind(*value) else {
        panic!("expected constructor reference");
    };
    assert_eq!(*mode, RefMode::New);
}

#[test]
fn unbound_generic_method_reference() {
    // `List<String>::size` is a method reference, not a comparison
    let (out, expr) = parse_expr_clean("f = List<String>::size");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::MemberRef { target, name, .. } = out.arena.kind(*value) else {
        panic!(
            "expected method reference, got {:?}",
            out.arena.kind(*value)
        );
    };
    assert_eq!(spelling(&out, *name), "size");
    assert!(matches!(out.arena.kind(*target), Tree::TypeApply { .. }));
}

#[test]
fn less_than_stays_a_comparison() {
    let (out, expr) = parse_expr_clean("r = a < b");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    assert!(matches!(
        out.arena.kind(*value),
        Tree::Binary {
            op: BinaryOp::Lt,
            ..
        }
    ));
}

#[test]
fn hex_float_literal_value() {
    let (out, expr) = parse_expr_clean("d = 0x1.8p3");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    match out.arena.kind(*value) {
        Tree::Literal(Literal::Double(v)) => assert!((v - 12.0).abs() < f64::EPSILON),
        other => panic!("expected double literal, got {other:?}"),
    }
}

#[test]
fn binary_literal_value() {
    let (out, expr) = parse_expr_clean("i = 0b101");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    assert!(matches!(
        out.arena.kind(*value),
        Tree::Literal(Literal::Int(5))
    ));
}

#[test]
fn min_int_literal_negation_folds() {
    let (out, expr) = parse_expr_clean("i = -2147483648");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    assert!(matches!(
        out.arena.kind(*value),
        Tree::Literal(Literal::Int(-2_147_483_648))
    ));
}

#[test]
fn adjacent_string_literals_fold() {
    let (out, expr) = parse_expr_clean(r#"s = "foo" + "bar""#);
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    match out.arena.kind(*value) {
        Tree::Literal(Literal::String(text)) => assert_eq!(&**text, "foobar"),
        other => panic!("expected folded string literal, got {other:?}"),
    }
}

#[test]
fn string_folding_can_be_disabled() {
    let source = r#"class T { void m() { s = "foo" + "bar"; } }"#;
    let (out, diagnostics) = super::parse_configured(
        source,
        &ParserConfig {
            fold_strings: false,
            ..ParserConfig::default()
        },
    );
    assert!(diagnostics.is_empty());
    let expr = first_expr(&out);
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    assert!(matches!(
        out.arena.kind(*value),
        Tree::Binary {
            op: BinaryOp::Add,
            ..
        }
    ));
}

#[test]
fn folding_stops_at_non_literals() {
    let (out, expr) = parse_expr_clean(r#"s = "a" + x"#);
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    assert!(matches!(
        out.arena.kind(*value),
        Tree::Binary {
            op: BinaryOp::Add,
            ..
        }
    ));
}

#[test]
fn creators() {
    let (out, expr) = parse_expr_clean("o = new Widget(1, 2)");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::NewClass { args, class_body, .. } = out.arena.kind(*value) else {
        panic!("expected class instantiation");
    };
    assert_eq!(out.arena.items(*args).len(), 2);
    assert!(class_body.is_none());
}

#[test]
fn diamond_creator() {
    let (out, expr) = parse_expr_clean("o = new Box<>(1)");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::NewClass { class_type, .. } = out.arena.kind(*value) else {
        panic!("expected class instantiation");
    };
    // the diamond leaves an empty argument list on the type
    let Tree::TypeApply { args, .. } = out.arena.kind(*class_type) else {
        panic!("expected generic type");
    };
    assert!(out.arena.items(*args).is_empty());
}

#[test]
fn anonymous_class_creator() {
    let (out, expr) = parse_expr_clean("o = new Runnable() { public void run() { } }");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::NewClass { class_body: Some(body), .. } = out.arena.kind(*value) else {
        panic!("expected anonymous class");
    };
    let Tree::ClassDecl { members, .. } = out.arena.kind(*body) else {
        panic!("expected class body");
    };
    assert_eq!(out.arena.items(*members).len(), 1);
}

#[test]
fn array_creators() {
    let (out, expr) = parse_expr_clean("a = new int[3]");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::NewArray { dims, initializers, .. } = out.arena.kind(*value) else {
        panic!("expected array creation");
    };
    assert_eq!(out.arena.items(*dims).len(), 1);
    assert!(initializers.is_none());

    let (out, expr) = parse_expr_clean("a = new int[] { 1, 2, 3 }");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::NewArray { initializers: Some(inits), .. } = out.arena.kind(*value) else {
        panic!("expected initialized array");
    };
    assert_eq!(out.arena.items(*inits).len(), 3);
}

#[test]
fn qualified_new() {
    let (_out, _expr) = parse_expr_clean("o = outer.new Inner()");
}

#[test]
fn explicit_generic_method_invocation() {
    let (out, expr) = parse_expr_clean("x = this.<String>id(y)");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::MethodCall { type_args, .. } = out.arena.kind(*value) else {
        panic!("expected method call");
    };
    assert_eq!(out.arena.items(*type_args).len(), 1);
}

#[test]
fn class_literals() {
    let (out, expr) = parse_expr_clean("c = byte[].class");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::Select { target, name } = out.arena.kind(*value) else {
        panic!("expected class literal select, got {:?}", out.arena.kind(*value));
    };
    assert_eq!(spelling(&out, *name), "class");
    assert!(matches!(out.arena.kind(*target), Tree::ArrayType { .. }));

    let (out, expr) = parse_expr_clean("c = String.class");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    assert!(matches!(out.arena.kind(*value), Tree::Select { .. }));
}

#[test]
fn prefix_and_postfix() {
    let (out, expr) = parse_expr_clean("x = ++i");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    assert!(matches!(
        out.arena.kind(*value),
        Tree::Unary {
            op: UnaryOp::PreInc,
            ..
        }
    ));

    let (out, _) = parse_expr_clean("i++");
    let stats = first_method_stats(&out);
    let Tree::ExprStatement { expr } = out.arena.kind(stats[0]) else {
        panic!("expected expression statement");
    };
    assert!(matches!(
        out.arena.kind(*expr),
        Tree::Unary {
            op: UnaryOp::PostInc,
            ..
        }
    ));
}

#[test]
fn compound_assignment() {
    let (out, expr) = parse_expr_clean("x >>>= 2");
    assert!(matches!(
        out.arena.kind(expr),
        Tree::CompoundAssign {
            op: BinaryOp::Ushr,
            ..
        }
    ));
}

#[test]
fn call_and_index_chains() {
    let (out, expr) = parse_expr_clean("v = m().a[i].b(1)");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    assert!(matches!(out.arena.kind(*value), Tree::MethodCall { .. }));
}

#[test]
fn this_and_super_calls() {
    let out = parse_clean("class T { T() { this(1); } T(int x) { super(); } }");
    let members = super::first_class_members(&out);
    assert_eq!(members.len(), 2);
}

#[test]
fn conditional_is_right_associative() {
    let (out, expr) = parse_expr_clean("x = a ? b : c ? d : e");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::Conditional { else_expr, .. } = out.arena.kind(*value) else {
        panic!("expected conditional");
    };
    assert!(matches!(out.arena.kind(*else_expr), Tree::Conditional { .. }));
}

#[test]
fn intersection_cast() {
    let (out, expr) = parse_expr_clean("r = (Runnable & java.io.Serializable) x");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    let Tree::TypeCast { cast_type, .. } = out.arena.kind(*value) else {
        panic!("expected cast");
    };
    let Tree::TypeIntersection { bounds } = out.arena.kind(*cast_type) else {
        panic!("expected intersection type, got {:?}", out.arena.kind(*cast_type));
    };
    assert_eq!(out.arena.items(*bounds).len(), 2);
}

#[test]
fn generic_cast_vs_parenthesized_comparison() {
    // `(List<String>) x` is a cast
    let (out, expr) = parse_expr_clean("y = (List<String>) x");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    assert!(matches!(out.arena.kind(*value), Tree::TypeCast { .. }));

    // `(a < b)` stays a parenthesized comparison
    let (out, expr) = parse_expr_clean("y = (a < b) || c");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    assert!(matches!(
        out.arena.kind(*value),
        Tree::Binary {
            op: BinaryOp::Or,
            ..
        }
    ));
}

#[test]
fn negated_expression_vs_cast() {
    // `(x) - y` must parse as a subtraction, not a cast of unary minus
    let (out, expr) = parse_expr_clean("r = (x) - y");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    assert!(matches!(
        out.arena.kind(*value),
        Tree::Binary {
            op: BinaryOp::Sub,
            ..
        }
    ));
}

#[test]
fn char_and_string_literals() {
    let (out, expr) = parse_expr_clean(r"c = '\n'");
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    assert!(matches!(
        out.arena.kind(*value),
        Tree::Literal(Literal::Char('\n'))
    ));

    let (out, expr) = parse_expr_clean(r#"s = "hi\t""#);
    let Tree::Assign { value, .. } = out.arena.kind(expr) else {
        panic!("expected assignment");
    };
    match out.arena.kind(*value) {
        Tree::Literal(Literal::String(text)) => assert_eq!(&**text, "hi\t"),
        other => panic!("expected string literal, got {other:?}"),
    }
}

#[test]
fn assert_statement_parses() {
    let out = parse_clean("class T { void m() { assert x > 0 : \"positive\"; } }");
    let stats = first_method_stats(&out);
    assert!(matches!(
        out.arena.kind(stats[0]),
        Tree::Assert { detail: Some(_), .. }
    ));
}

#[test]
fn parse_source_reports_nothing_on_empty_unit() {
    let (out, diagnostics) = parse_source("");
    assert!(diagnostics.is_empty());
    assert!(unit_types_empty(&out));
}

fn unit_types_empty(out: &crate::ParseOutcome) -> bool {
    match out.arena.kind(out.unit) {
        Tree::CompilationUnit { type_decls, .. } => out.arena.items(*type_decls).is_empty(),
        _ => false,
    }
}
