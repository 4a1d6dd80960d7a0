// SPDX-License-Identifier: PMPL-1.0-or-later

//! Known-vulnerability pattern matching
//!
//! Plain case-sensitive substring search, one hit per rule, in catalog
//! order. Text inside comments and string literals counts.

use crate::catalog::Catalog;
use crate::types::VulnerabilityMatch;

pub fn detect_vulnerabilities(code: &str, catalog: &Catalog) -> Vec<VulnerabilityMatch> {
    catalog
        .iter()
        .filter(|rule| code.contains(rule.pattern.as_str()))
        .map(VulnerabilityMatch::from)
        .collect()
}
