// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sweep: batch analysis of Python sources on disk
//!
//! A target is either a single file or a directory. Directories are walked
//! for `*.py` files, which are analyzed in parallel against one shared
//! catalog. Results are sorted by vulnerability count (highest first).

use crate::analysis;
use crate::catalog::Catalog;
use crate::types::{AnalysisReport, SyntaxStatus};
use anyhow::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Directories never worth descending into
const SKIPPED_DIRS: &[&str] = &[".git", "__pycache__", ".venv", "venv", "node_modules", ".tox"];

/// Result of analyzing a single file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    pub file_path: String,
    pub lines: usize,
    pub vulnerability_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<AnalysisReport>,
}

/// Complete sweep report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub created_at: String,
    pub target: PathBuf,
    pub files_scanned: usize,
    pub files_with_findings: usize,
    pub syntax_errors: usize,
    pub total_vulnerabilities: usize,
    pub results: Vec<FileResult>,
}

/// Find Python sources under `target` (or `target` itself if it is a file).
pub fn discover_sources(target: &Path) -> Result<Vec<PathBuf>> {
    if !target.exists() {
        anyhow::bail!("Target does not exist: {}", target.display());
    }
    if target.is_file() {
        return Ok(vec![target.to_path_buf()]);
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(target)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && entry.depth() > 0
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| SKIPPED_DIRS.contains(&name)))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        let is_python = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "py" || ext == "pyw");
        if entry.file_type().is_file() && is_python {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Read a source file as text: UTF-8 first, then Windows-1252.
pub fn read_source(path: &Path) -> Result<String> {
    let raw_bytes = fs::read(path)?;
    match String::from_utf8(raw_bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            let raw_bytes = err.into_bytes();
            let (cow, _, had_errors) = encoding_rs::WINDOWS_1252.decode(&raw_bytes);
            if had_errors {
                anyhow::bail!("{} is neither UTF-8 nor Latin-1 text", path.display());
            }
            Ok(cow.into_owned())
        }
    }
}

fn analyze_file(path: &Path, base: &Path, catalog: &Catalog) -> FileResult {
    let file_path = path
        .strip_prefix(base)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .unwrap_or(path)
        .to_string_lossy()
        .to_string();

    match read_source(path) {
        Ok(code) => {
            let report = analysis::analyze(&code, catalog);
            debug!("{}: {} vulnerabilities", file_path, report.vulnerabilities.len());
            FileResult {
                file_path,
                lines: code.lines().count(),
                vulnerability_count: report.vulnerabilities.len(),
                error: None,
                report: Some(report),
            }
        }
        Err(e) => {
            warn!("Skipping {}: {}", file_path, e);
            FileResult {
                file_path,
                lines: 0,
                vulnerability_count: 0,
                error: Some(e.to_string()),
                report: None,
            }
        }
    }
}

/// Analyze every Python source under `target`.
pub fn run(target: &Path, catalog: &Catalog) -> Result<SweepReport> {
    let files = discover_sources(target)?;
    let base = if target.is_dir() {
        target.to_path_buf()
    } else {
        target.parent().unwrap_or(Path::new(".")).to_path_buf()
    };

    let mut results: Vec<FileResult> = files
        .par_iter()
        .map(|file| analyze_file(file, &base, catalog))
        .collect();

    // Riskiest files first; ties keep path order.
    results.sort_by(|a, b| {
        b.vulnerability_count
            .cmp(&a.vulnerability_count)
            .then_with(|| a.file_path.cmp(&b.file_path))
    });

    let files_with_findings = results.iter().filter(|r| r.vulnerability_count > 0).count();
    let total_vulnerabilities = results.iter().map(|r| r.vulnerability_count).sum();
    let syntax_errors = results
        .iter()
        .filter_map(|r| r.report.as_ref())
        .filter(|report| report.syntax.status == SyntaxStatus::Error)
        .count();

    Ok(SweepReport {
        created_at: chrono::Utc::now().to_rfc3339(),
        target: target.to_path_buf(),
        files_scanned: files.len(),
        files_with_findings,
        syntax_errors,
        total_vulnerabilities,
        results,
    })
}
