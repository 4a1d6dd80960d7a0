// SPDX-License-Identifier: PMPL-1.0-or-later

//! Textual style heuristics (PEP 8 flavoured)

use crate::types::{FormatResult, FormatStatus};

/// PEP 8 maximum line length
pub const MAX_LINE_LENGTH: usize = 79;

const COMPLETED_MESSAGE: &str = "Code formatting analysis completed";
const MIXED_INDENTATION: &str =
    "Mixed usage of tabs and spaces found. Stick to 4 spaces for indentation";
const TRAILING_WHITESPACE: &str = "Trailing whitespace found in some lines";

/// Run every style heuristic over the snippet. Never fails.
pub fn check_style(code: &str) -> FormatResult {
    let mut improvements = long_lines(code);

    if has_mixed_indentation(code) {
        improvements.push(MIXED_INDENTATION.to_string());
    }

    if has_trailing_whitespace(code) {
        improvements.push(TRAILING_WHITESPACE.to_string());
    }

    FormatResult {
        status: if improvements.is_empty() {
            FormatStatus::Success
        } else {
            FormatStatus::Warning
        },
        message: COMPLETED_MESSAGE.to_string(),
        improvements,
    }
}

/// One message per line whose stripped length exceeds the limit.
fn long_lines(code: &str) -> Vec<String> {
    code.split('\n')
        .enumerate()
        .filter(|(_, line)| {
            line.trim_matches(is_python_whitespace).chars().count() > MAX_LINE_LENGTH
        })
        .map(|(i, _)| {
            format!(
                "Line {} exceeds PEP 8's recommended maximum length of {} characters",
                i + 1,
                MAX_LINE_LENGTH
            )
        })
        .collect()
}

// Whole-snippet check, not per line.
fn has_mixed_indentation(code: &str) -> bool {
    code.contains("    ") && code.contains('\t')
}

fn has_trailing_whitespace(code: &str) -> bool {
    code.split('\n')
        .any(|line| line.trim_end_matches(is_python_whitespace) != line)
}

/// Whitespace as Python's `str.strip` sees it: Unicode whitespace plus the
/// ASCII information separators U+001C..U+001F.
fn is_python_whitespace(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}
