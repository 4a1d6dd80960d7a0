// SPDX-License-Identifier: PMPL-1.0-or-later

//! Python syntax validation
//!
//! Uses the tree-sitter Python grammar. Tree-sitter recovers from errors
//! instead of stopping, so a snippet is invalid when the tree carries any
//! ERROR or MISSING node; the first one in document order is reported.
//! Trees that parse cleanly are then checked against the Python 3 rules the
//! grammar is too permissive to enforce.
//!
//! Every walk is iterative: nesting depth is attacker controlled.

mod rules;

use crate::types::{SyntaxResult, SyntaxStatus};
use tree_sitter::{Node, Parser, Tree, TreeCursor};

const SUCCESS_MESSAGE: &str = "No syntax errors detected.";
const SUCCESS_DETAILS: &str = "The code is syntactically correct and can be executed.";

/// A located parse failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxFault {
    /// 1-based line, `None` when the parser gave no location
    pub line: Option<usize>,
    /// 1-based character column
    pub column: Option<usize>,
    pub error_type: &'static str,
    pub text: String,
}

impl SyntaxFault {
    fn unlocated(error_type: &'static str, text: String) -> Self {
        Self {
            line: None,
            column: None,
            error_type,
            text,
        }
    }

    fn into_result(self) -> SyntaxResult {
        let line = self.line.map_or_else(|| "unknown".to_string(), |l| l.to_string());
        let column = self
            .column
            .map_or_else(|| "unknown".to_string(), |c| c.to_string());
        SyntaxResult {
            status: SyntaxStatus::Error,
            message: format!("Syntax error on line {}, column {}: {}", line, column, self.text),
            details: format!("Error type: {}\nFull error: {}", self.error_type, self.text),
        }
    }
}

/// Check a snippet for Python syntax errors.
pub fn check_syntax(code: &str) -> SyntaxResult {
    match find_fault(code) {
        None => SyntaxResult {
            status: SyntaxStatus::Success,
            message: SUCCESS_MESSAGE.to_string(),
            details: SUCCESS_DETAILS.to_string(),
        },
        Some(fault) => fault.into_result(),
    }
}

/// Locate the first syntax fault in `code`, if any.
pub fn find_fault(code: &str) -> Option<SyntaxFault> {
    let tree = match parse(code) {
        Ok(tree) => tree,
        Err(fault) => return Some(fault),
    };

    let root = tree.root_node();
    if !root.has_error() {
        return rules::first_violation(root, code);
    }

    let node = first_fault_node(root)?;
    Some(describe(node, code))
}

fn parse(code: &str) -> Result<Tree, SyntaxFault> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| SyntaxFault::unlocated("ParserUnavailable", e.to_string()))?;
    parser.parse(code, None).ok_or_else(|| {
        SyntaxFault::unlocated("ParserUnavailable", "parser produced no syntax tree".to_string())
    })
}

/// Pre-order traversal driven by a single `TreeCursor`.
struct Preorder<'t> {
    cursor: TreeCursor<'t>,
    done: bool,
}

impl<'t> Preorder<'t> {
    fn new(node: Node<'t>) -> Self {
        Self {
            cursor: node.walk(),
            done: false,
        }
    }
}

impl<'t> Iterator for Preorder<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Node<'t>> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();
        if !self.cursor.goto_first_child() {
            while !self.cursor.goto_next_sibling() {
                if !self.cursor.goto_parent() {
                    self.done = true;
                    break;
                }
            }
        }
        Some(node)
    }
}

fn first_fault_node(root: Node<'_>) -> Option<Node<'_>> {
    Preorder::new(root).find(|node| node.is_error() || node.is_missing())
}

fn describe(node: Node<'_>, code: &str) -> SyntaxFault {
    if node.is_missing() {
        return describe_missing(node, code);
    }

    if let Some(start) = unterminated_string(node) {
        return located(start, code, "SyntaxError", unterminated_text(start));
    }

    if let Some(open) = unclosed_bracket(node) {
        let text = format!("'{}' was never closed", open.kind());
        return located(open, code, "SyntaxError", text);
    }

    located(node, code, "SyntaxError", "invalid syntax".to_string())
}

fn describe_missing(node: Node<'_>, code: &str) -> SyntaxFault {
    let kind = node.kind();
    match kind {
        "string_end" => located(node, code, "SyntaxError", unterminated_text(node)),
        ")" | "]" | "}" => {
            let open = opening_for(kind);
            let anchor = node
                .parent()
                .and_then(|p| find_child_kind(p, open))
                .unwrap_or(node);
            located(anchor, code, "SyntaxError", format!("'{}' was never closed", open))
        }
        "_indent" | "indent" => located(
            node,
            code,
            "IndentationError",
            "expected an indented block".to_string(),
        ),
        other => located(node, code, "SyntaxError", format!("expected '{}'", other)),
    }
}

fn unterminated_text(node: Node<'_>) -> String {
    format!(
        "unterminated string literal (detected at line {})",
        node.start_position().row + 1
    )
}

/// A `string_start` inside the error region with no matching `string_end`.
fn unterminated_string(node: Node<'_>) -> Option<Node<'_>> {
    let mut open = Vec::new();
    for token in leaves(node) {
        match token.kind() {
            "string_start" => open.push(token),
            "string_end" if !token.is_missing() => {
                open.pop();
            }
            _ => {}
        }
    }
    open.into_iter().next()
}

/// An opening bracket inside the error region that is never closed.
fn unclosed_bracket(node: Node<'_>) -> Option<Node<'_>> {
    let mut stack = Vec::new();
    for token in leaves(node) {
        match token.kind() {
            "(" | "[" | "{" => stack.push(token),
            ")" | "]" | "}" if !token.is_missing() => {
                stack.pop();
            }
            _ => {}
        }
    }
    stack.into_iter().next()
}

/// Leaf tokens under `node`, in document order.
fn leaves(node: Node<'_>) -> impl Iterator<Item = Node<'_>> {
    Preorder::new(node).filter(|n| n.child_count() == 0)
}

fn find_child_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn opening_for(closing: &str) -> &'static str {
    match closing {
        ")" => "(",
        "]" => "[",
        _ => "{",
    }
}

fn located(node: Node<'_>, code: &str, error_type: &'static str, text: String) -> SyntaxFault {
    let point = node.start_position();
    SyntaxFault {
        line: Some(point.row + 1),
        column: Some(char_column(code, point.row, point.column) + 1),
        error_type,
        text,
    }
}

/// Convert a tree-sitter byte column into a character column.
fn char_column(code: &str, row: usize, byte_column: usize) -> usize {
    let line = code.split('\n').nth(row).unwrap_or("");
    let end = byte_column.min(line.len());
    match line.get(..end) {
        Some(prefix) => prefix.chars().count(),
        None => String::from_utf8_lossy(&line.as_bytes()[..end]).chars().count(),
    }
}
