// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report output module

pub mod formatter;
pub mod output;

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

pub use formatter::ReportFormatter;
pub use output::ReportOutputFormat;

/// Save a report to `path` in the given format
pub fn save_report<T, P>(report: &T, path: P, format: ReportOutputFormat) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format.serialize(report)?)?;
    info!("Report saved to: {}", path.display());
    Ok(())
}
