// SPDX-License-Identifier: PMPL-1.0-or-later

//! Terminal rendering of analysis results

use crate::catalog::Catalog;
use crate::sweep::{FileResult, SweepReport};
use crate::types::*;
use colored::*;

pub struct ReportFormatter {
    verbose: bool,
}

/// Colour for a free-form severity label
fn severity_color(severity: &str) -> Color {
    match severity.trim().to_ascii_lowercase().as_str() {
        "critical" | "high" => Color::Red,
        "medium" | "moderate" => Color::Yellow,
        "low" => Color::Blue,
        _ => Color::White,
    }
}

impl ReportFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn print_sweep(&self, report: &SweepReport) {
        println!("\n{}", "=== SNIPPET AUDIT ===".bold().cyan());
        println!(
            "Target: {}  |  Files: {}  |  With findings: {}  |  Syntax errors: {}",
            report.target.display(),
            report.files_scanned,
            report.files_with_findings,
            report.syntax_errors
        );
        println!("Total vulnerabilities: {}", report.total_vulnerabilities);
        println!();

        if report.results.is_empty() {
            println!("  No Python sources found.");
            return;
        }

        for result in &report.results {
            self.print_file(result);
        }
    }

    fn print_file(&self, result: &FileResult) {
        if let Some(err) = &result.error {
            println!("{} {}", result.file_path.bold(), format!("ERROR: {}", err).red());
            return;
        }
        let Some(report) = &result.report else {
            return;
        };

        // Quiet mode only lists files that need attention.
        let clean = report.vulnerabilities.is_empty()
            && report.syntax.status == SyntaxStatus::Success
            && report.formatting.status == FormatStatus::Success;
        if clean && !self.verbose {
            return;
        }

        println!("{} ({} lines)", result.file_path.bold(), result.lines);
        self.print_report(report);
        println!();
    }

    pub fn print_report(&self, report: &AnalysisReport) {
        let syntax = match report.syntax.status {
            SyntaxStatus::Success => report.syntax.message.green(),
            SyntaxStatus::Error => report.syntax.message.red(),
        };
        println!("  {} {}", "Syntax:".bold(), syntax);
        if self.verbose && report.syntax.status == SyntaxStatus::Error {
            for line in report.syntax.details.lines() {
                println!("    {}", line.dimmed());
            }
        }

        if !report.vulnerabilities.is_empty() {
            println!("  {}", "Vulnerabilities:".bold());
            for (i, vuln) in report.vulnerabilities.iter().enumerate() {
                println!(
                    "    {}. [{}] {} - {}",
                    i + 1,
                    vuln.severity.color(severity_color(&vuln.severity)),
                    vuln.issue.bold(),
                    vuln.description
                );
                println!("       Fix: {}", vuln.example_fix.dimmed());
            }
        }

        if !report.formatting.improvements.is_empty() {
            println!("  {}", "Formatting:".bold());
            for item in &report.formatting.improvements {
                println!("    - {}", item.yellow());
            }
        }

        if !report.improvements.is_empty() {
            println!("  {}", "Suggestions:".bold());
            for item in &report.improvements {
                println!("    - {}", item);
            }
        }
    }

    pub fn print_catalog(&self, catalog: &Catalog) {
        println!("{} ({} rules)", "VULNERABILITY CATALOG".bold().yellow(), catalog.len());
        for (i, rule) in catalog.iter().enumerate() {
            println!(
                "  {:>3}. [{}] {} {}",
                i + 1,
                rule.severity.color(severity_color(&rule.severity)),
                rule.issue.bold(),
                format!("({})", rule.pattern).dimmed()
            );
            if self.verbose {
                println!("       {}", rule.description);
                println!("       Fix: {}", rule.example_fix);
            }
        }
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_colors() {
        assert_eq!(severity_color("HIGH"), Color::Red);
        assert_eq!(severity_color(" critical "), Color::Red);
        assert_eq!(severity_color("medium"), Color::Yellow);
        assert_eq!(severity_color("low"), Color::Blue);
        assert_eq!(severity_color("informational"), Color::White);
    }
}
