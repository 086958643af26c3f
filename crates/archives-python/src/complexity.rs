//! Cyclomatic complexity of Python functions.
//!
//! Counting follows radon's conventions, so claims written against radon
//! output stay valid:
//!
//! | construct | adds |
//! |---|---|
//! | `if`, `elif`, conditional expression | 1 |
//! | `for` / `while` | 1, plus 1 for an `else` block |
//! | `try` | 1 per `except` clause, plus 1 for an `else` block |
//! | `and` / `or` | 1 per operator |
//! | comprehension | 1 per `for` clause and per `if` filter |
//! | `match` | 1 per case, minus 1 when a catch-all case exists |
//! | `assert` | 1 |
//!
//! Nested function and class definitions are scored separately and do not
//! contribute to the enclosing function.

use archives_core::syntax::{Complexity, ComplexityOracle};
use tree_sitter::Node;

use crate::node::PyNode;

/// Complexity oracle for [`PyNode`] functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct McCabe;

impl McCabe {
    /// Creates the oracle.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<'t> ComplexityOracle<PyNode<'t>> for McCabe {
    fn measure(&self, function: &PyNode<'t>) -> Complexity {
        let body = function.ts_node().child_by_field_name("body");
        Complexity {
            score: 1 + body.map_or(0, branches),
            is_method: function.is_in_class_body(),
        }
    }
}

fn branches(node: Node<'_>) -> u32 {
    let mut total = 0;
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        total += match child.kind() {
            "function_definition" | "class_definition" | "decorated_definition" => 0,
            "if_statement" | "elif_clause" | "conditional_expression" | "boolean_operator"
            | "for_in_clause" | "assert_statement" => 1 + branches(child),
            "if_clause" if node.kind() != "case_clause" => 1 + branches(child),
            "for_statement" | "while_statement" => {
                1 + count_children(child, &["else_clause"]) + branches(child)
            }
            "try_statement" => {
                count_children(child, &["except_clause", "except_group_clause", "else_clause"])
                    + branches(child)
            }
            "match_statement" => match_cases(child) + branches(child),
            _ => branches(child),
        };
    }
    total
}

fn count_children(node: Node<'_>, kinds: &[&str]) -> u32 {
    let mut cursor = node.walk();
    let count = node
        .named_children(&mut cursor)
        .filter(|child| kinds.contains(&child.kind()))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Cases of a `match`, not counting a catch-all.
fn match_cases(node: Node<'_>) -> u32 {
    let mut cases = 0;
    let mut catch_all = false;
    let mut cursor = node.walk();
    for block in node.named_children(&mut cursor) {
        if block.kind() != "block" {
            continue;
        }
        let mut inner = block.walk();
        for case in block.named_children(&mut inner) {
            if case.kind() == "case_clause" {
                cases += 1;
                catch_all |= is_catch_all(case);
            }
        }
    }
    cases - u32::from(catch_all)
}

/// `case _:` or a bare capture such as `case other:`.
fn is_catch_all(case: Node<'_>) -> bool {
    let mut cursor = case.walk();
    let patterns: Vec<Node<'_>> = case
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "case_pattern")
        .collect();
    let [pattern] = patterns.as_slice() else {
        return false;
    };
    if pattern.named_child_count() == 0 {
        return true;
    }
    let mut inner = pattern.walk();
    let only: Vec<Node<'_>> = pattern.named_children(&mut inner).collect();
    match only.as_slice() {
        [capture] if capture.kind() == "dotted_name" => capture.named_child_count() == 1,
        [capture] => capture.kind() == "identifier",
        _ => false,
    }
}
