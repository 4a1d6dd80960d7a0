// SPDX-License-Identifier: PMPL-1.0-or-later

//! Python 3 rules the tree-sitter grammar accepts but CPython rejects
//!
//! The grammar keeps Python 2 statements (`print x`, `exec code`), the `<>`
//! operator, and loose forms of `del`, `:=` and call arguments. Each check
//! below runs over a tree without ERROR nodes and reports the first
//! offending node in document order.

use super::{find_child_kind, located, Preorder, SyntaxFault};
use tree_sitter::Node;

pub(super) fn first_violation(root: Node<'_>, code: &str) -> Option<SyntaxFault> {
    Preorder::new(root).find_map(|node| check_node(node, code))
}

fn check_node(node: Node<'_>, code: &str) -> Option<SyntaxFault> {
    match node.kind() {
        // `print >>f, x` is a valid tuple expression in Python 3.
        "print_statement" if find_child_kind(node, "chevron").is_none() => {
            Some(legacy_statement(node, code, "print"))
        }
        "exec_statement" => Some(legacy_statement(node, code, "exec")),
        "comparison_operator" => find_child_kind(node, "<>")
            .map(|op| located(op, code, "SyntaxError", "invalid syntax".to_string())),
        "named_expression" => bare_named_expression(node, code),
        "delete_statement" => invalid_delete(node, code),
        "argument_list" => misordered_argument(node, code),
        _ => None,
    }
}

fn legacy_statement(node: Node<'_>, code: &str, name: &str) -> SyntaxFault {
    let text = format!(
        "Missing parentheses in call to '{}'. Did you mean {}(...)?",
        name, name
    );
    located(node, code, "SyntaxError", text)
}

/// `x := 1` needs parentheses at statement level and as an assignment value.
fn bare_named_expression(node: Node<'_>, code: &str) -> Option<SyntaxFault> {
    let parent = node.parent()?;
    match parent.kind() {
        "expression_statement" | "assignment" | "augmented_assignment" => {
            let anchor = find_child_kind(node, ":=").unwrap_or(node);
            Some(located(anchor, code, "SyntaxError", "invalid syntax".to_string()))
        }
        _ => None,
    }
}

fn invalid_delete(node: Node<'_>, code: &str) -> Option<SyntaxFault> {
    let mut pending: Vec<Node<'_>> = named_children(node);
    pending.reverse();

    while let Some(target) = pending.pop() {
        match target.kind() {
            "identifier" | "keyword_identifier" | "attribute" | "subscript" => {}
            "tuple" | "list" | "expression_list" | "parenthesized_expression" => {
                let mut inner = named_children(target);
                inner.reverse();
                pending.extend(inner);
            }
            other => {
                let text = format!("cannot delete {}", delete_target_name(other));
                return Some(located(target, code, "SyntaxError", text));
            }
        }
    }
    None
}

fn delete_target_name(kind: &str) -> &'static str {
    match kind {
        "call" => "function call",
        "integer" | "float" | "string" | "concatenated_string" | "true" | "false" | "none"
        | "ellipsis" => "literal",
        "comparison_operator" => "comparison",
        "conditional_expression" => "conditional expression",
        "lambda" => "lambda",
        "named_expression" => "named expression",
        "dictionary" | "set" => "dict literal",
        _ => "expression",
    }
}

/// Positional and unpacking order inside a call or class header.
fn misordered_argument(node: Node<'_>, code: &str) -> Option<SyntaxFault> {
    let mut seen_keyword = false;
    let mut seen_mapping_unpack = false;
    let mut keywords: Vec<&str> = Vec::new();

    for arg in named_children(node) {
        let text = match arg.kind() {
            "keyword_argument" => {
                seen_keyword = true;
                let name = arg
                    .child_by_field_name("name")
                    .and_then(|n| n.utf8_text(code.as_bytes()).ok());
                match name {
                    Some(name) if keywords.contains(&name) => {
                        format!("keyword argument repeated: {}", name)
                    }
                    Some(name) => {
                        keywords.push(name);
                        continue;
                    }
                    None => continue,
                }
            }
            "dictionary_splat" => {
                seen_mapping_unpack = true;
                continue;
            }
            _ if is_iterable_unpack(arg) => {
                if !seen_mapping_unpack {
                    continue;
                }
                "iterable argument unpacking follows keyword argument unpacking".to_string()
            }
            _ if seen_mapping_unpack => {
                "positional argument follows keyword argument unpacking".to_string()
            }
            _ if seen_keyword => "positional argument follows keyword argument".to_string(),
            _ => continue,
        };
        return Some(located(arg, code, "SyntaxError", text));
    }
    None
}

fn is_iterable_unpack(arg: Node<'_>) -> bool {
    match arg.kind() {
        "list_splat" => true,
        "parenthesized_expression" => named_children(arg)
            .first()
            .is_some_and(|inner| inner.kind() == "list_splat"),
        _ => false,
    }
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect();
    children
}
