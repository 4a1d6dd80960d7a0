// SPDX-License-Identifier: PMPL-1.0-or-later

//! Improvement suggestions
//!
//! Generic security advice when any catalog pattern matched, followed by
//! keyword-triggered hints. Each hint is an independent predicate over the
//! raw snippet text.

use crate::types::VulnerabilityMatch;
use tracing::debug;

pub const INPUT_VALIDATION: &str = "Consider implementing input validation for all user inputs";
pub const ERROR_HANDLING: &str =
    "Add error handling with try-except blocks around risky operations";
pub const USE_LOGGING: &str = "Consider using a proper logging system instead of print statements";
pub const SPECIFIC_EXCEPTIONS: &str =
    "Avoid bare except clauses. Catch specific exceptions instead";
pub const MINIMIZE_GLOBALS: &str =
    "Minimize use of global variables to improve code maintainability";

/// A keyword-triggered hint
pub struct SnippetHint {
    pub name: &'static str,
    pub applies: fn(&str) -> bool,
    pub suggestion: &'static str,
}

/// Hints in emission order
pub const SNIPPET_HINTS: &[SnippetHint] = &[
    SnippetHint {
        name: "print-call",
        applies: uses_print,
        suggestion: USE_LOGGING,
    },
    SnippetHint {
        name: "bare-except",
        applies: uses_bare_except,
        suggestion: SPECIFIC_EXCEPTIONS,
    },
    SnippetHint {
        name: "global-declaration",
        applies: uses_global,
        suggestion: MINIMIZE_GLOBALS,
    },
];

fn uses_print(code: &str) -> bool {
    code.contains("print(")
}

fn uses_bare_except(code: &str) -> bool {
    code.contains("except:")
}

fn uses_global(code: &str) -> bool {
    code.contains("global ")
}

pub fn generate_improvements(code: &str, vulnerabilities: &[VulnerabilityMatch]) -> Vec<String> {
    let mut suggestions = Vec::new();

    if !vulnerabilities.is_empty() {
        suggestions.push(INPUT_VALIDATION.to_string());
        suggestions.push(ERROR_HANDLING.to_string());
    }

    suggestions.extend(
        SNIPPET_HINTS
            .iter()
            .filter(|hint| (hint.applies)(code))
            .inspect(|hint| debug!(hint = hint.name, "suggestion triggered"))
            .map(|hint| hint.suggestion.to_string()),
    );

    suggestions
}
