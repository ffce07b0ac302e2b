#![allow(dead_code)]
//! Shared helpers for `fiql-syntax` integration tests.

use fiql_syntax::*;

pub fn operators() -> Operators {
    let mut operators = Operators::new();
    operators
        .register("=in=", ConditionKind::Custom)
        .unwrap()
        .register("=out=", ConditionKind::Custom)
        .unwrap();
    operators
}

pub fn parse_ok(input: &str) -> Expr {
    parse_expression(input, &operators()).unwrap()
}

pub fn parse_err(input: &str) -> ParseError {
    parse_expression(input, &operators()).unwrap_err()
}

pub fn as_and(expr: &Expr) -> &Vec<Expr> {
    match expr {
        Expr::And(parts) => parts,
        other => panic!("expected And, got: {other:?}"),
    }
}

pub fn as_or(expr: &Expr) -> &Vec<Expr> {
    match expr {
        Expr::Or(parts) => parts,
        other => panic!("expected Or, got: {other:?}"),
    }
}

pub fn as_leaf(expr: &Expr) -> &Comparison {
    match expr {
        Expr::Leaf(comparison) => comparison,
        other => panic!("expected Leaf, got: {other:?}"),
    }
}

pub fn leaf_is(expr: &Expr, selector: &str, operator: &str, argument: &str) {
    let comparison = as_leaf(expr);
    assert_eq!(comparison.selector, selector);
    assert_eq!(comparison.operator, operator);
    assert_eq!(comparison.argument, argument);
}

/// Maximum bracket nesting of `input`, failing the test if depth ever drops
/// below zero.
pub fn max_depth(input: &str) -> usize {
    let mut depth = 0i64;
    let mut max = 0i64;
    for ch in input.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        assert!(depth >= 0, "negative depth in {input:?}");
        max = max.max(depth);
    }
    assert_eq!(depth, 0, "unbalanced {input:?}");
    max as usize
}
