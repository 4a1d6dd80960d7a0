// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions for snippet-audit
//!
//! Everything here is produced once per analysis and never mutated
//! afterwards. Field names are the wire format of the `/analyze`
//! endpoint, so renaming a field is a breaking change for clients.

use serde::{Deserialize, Serialize};

/// Message returned in place of a report when the pattern catalog is missing.
pub const CATALOG_UNAVAILABLE_MESSAGE: &str =
    "Dataset not loaded. Cannot perform vulnerability analysis.";

/// One row of the vulnerability catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    /// Literal text searched for in the snippet
    pub pattern: String,
    pub issue: String,
    pub description: String,
    /// Opaque label copied through from the catalog (e.g. "high")
    pub severity: String,
    pub example_fix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatStatus {
    Success,
    Warning,
}

impl std::fmt::Display for SyntaxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyntaxStatus::Success => write!(f, "success"),
            SyntaxStatus::Error => write!(f, "error"),
        }
    }
}

impl std::fmt::Display for FormatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatStatus::Success => write!(f, "success"),
            FormatStatus::Warning => write!(f, "warning"),
        }
    }
}

/// Outcome of parsing the snippet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxResult {
    pub status: SyntaxStatus,
    pub message: String,
    pub details: String,
}

/// Outcome of the textual style heuristics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatResult {
    pub status: FormatStatus,
    pub message: String,
    pub improvements: Vec<String>,
}

/// A catalog rule whose pattern occurs in the snippet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityMatch {
    pub issue: String,
    pub description: String,
    pub severity: String,
    pub example_fix: String,
}

impl From<&PatternRule> for VulnerabilityMatch {
    fn from(rule: &PatternRule) -> Self {
        Self {
            issue: rule.issue.clone(),
            description: rule.description.clone(),
            severity: rule.severity.clone(),
            example_fix: rule.example_fix.clone(),
        }
    }
}

/// Full result of one analysis call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub syntax: SyntaxResult,
    pub formatting: FormatResult,
    pub vulnerabilities: Vec<VulnerabilityMatch>,
    pub improvements: Vec<String>,
}

/// What `analyze_code` hands back to callers.
///
/// Serialized untagged: a client sees either the four report fields or a
/// lone `error` key, and must check for `error` first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Report(AnalysisReport),
    Unavailable { error: String },
}

impl AnalysisOutcome {
    pub fn catalog_unavailable() -> Self {
        AnalysisOutcome::Unavailable {
            error: CATALOG_UNAVAILABLE_MESSAGE.to_string(),
        }
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            AnalysisOutcome::Report(report) => Some(report),
            AnalysisOutcome::Unavailable { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AnalysisOutcome::Report(_) => None,
            AnalysisOutcome::Unavailable { error } => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> AnalysisReport {
        AnalysisReport {
            syntax: SyntaxResult {
                status: SyntaxStatus::Success,
                message: "No syntax errors detected.".to_string(),
                details: "ok".to_string(),
            },
            formatting: FormatResult {
                status: FormatStatus::Success,
                message: "Code formatting analysis completed".to_string(),
                improvements: vec![],
            },
            vulnerabilities: vec![],
            improvements: vec![],
        }
    }

    #[test]
    fn test_report_field_names() {
        let json = serde_json::to_value(AnalysisOutcome::Report(sample_report())).unwrap();
        assert_eq!(json["syntax"]["status"], "success");
        assert!(json["syntax"].get("details").is_some());
        assert_eq!(json["formatting"]["status"], "success");
        assert!(json["formatting"]["improvements"].is_array());
        assert!(json["vulnerabilities"].is_array());
        assert!(json["improvements"].is_array());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_unavailable_shape_has_only_error() {
        let json = serde_json::to_value(AnalysisOutcome::catalog_unavailable()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["error"], CATALOG_UNAVAILABLE_MESSAGE);
    }

    #[test]
    fn test_match_copies_rule_metadata() {
        let rule = PatternRule {
            pattern: "eval(".to_string(),
            issue: "Use of eval".to_string(),
            description: "Arbitrary code execution".to_string(),
            severity: "high".to_string(),
            example_fix: "ast.literal_eval".to_string(),
        };
        let m = VulnerabilityMatch::from(&rule);
        assert_eq!(m.issue, "Use of eval");
        assert_eq!(m.severity, "high");
        assert_eq!(m.example_fix, "ast.literal_eval");
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("pattern").is_none());
    }
}
