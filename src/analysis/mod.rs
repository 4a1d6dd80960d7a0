// SPDX-License-Identifier: PMPL-1.0-or-later

//! Snippet analysis pipeline
//!
//! Syntax check, style check, pattern match, then suggestions. All four
//! always run; a syntax error is reported as data and the remaining checks
//! still scan the text.

pub mod matcher;
pub mod style;
pub mod suggestions;
pub mod syntax;

use crate::catalog::Catalog;
use crate::types::*;
use std::path::Path;
use tracing::{debug, warn};

pub use matcher::detect_vulnerabilities;
pub use style::check_style;
pub use suggestions::generate_improvements;
pub use syntax::check_syntax;

/// Analyze a snippet against an already loaded catalog.
pub fn analyze(code: &str, catalog: &Catalog) -> AnalysisReport {
    let syntax = check_syntax(code);
    let formatting = check_style(code);
    let vulnerabilities = detect_vulnerabilities(code, catalog);
    let improvements = generate_improvements(code, &vulnerabilities);

    debug!(
        syntax = %syntax.status,
        formatting = %formatting.status,
        vulnerabilities = vulnerabilities.len(),
        "snippet analyzed"
    );

    AnalysisReport {
        syntax,
        formatting,
        vulnerabilities,
        improvements,
    }
}

/// Load the catalog at `catalog_path` and analyze `code` against it.
///
/// A missing or malformed catalog yields the `error`-only outcome and no
/// check is run.
pub fn analyze_code<P: AsRef<Path>>(code: &str, catalog_path: P) -> AnalysisOutcome {
    match Catalog::load(catalog_path.as_ref()) {
        Ok(catalog) => AnalysisOutcome::Report(analyze(code, &catalog)),
        Err(e) => {
            warn!("{}", e);
            AnalysisOutcome::catalog_unavailable()
        }
    }
}

/// Analyze against a catalog that may have failed to load.
pub fn analyze_with(code: &str, catalog: Option<&Catalog>) -> AnalysisOutcome {
    match catalog {
        Some(catalog) => AnalysisOutcome::Report(analyze(code, catalog)),
        None => AnalysisOutcome::catalog_unavailable(),
    }
}
