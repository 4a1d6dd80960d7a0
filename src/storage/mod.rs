// SPDX-License-Identifier: PMPL-1.0-or-later

//! Timestamped report persistence

use crate::report::ReportOutputFormat;
use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "snippet-audit-";

/// Write `report` into `directory` once per format. Returns the written paths.
pub fn persist_report<T: Serialize>(
    report: &T,
    directory: &Path,
    formats: &[ReportOutputFormat],
) -> Result<Vec<PathBuf>> {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
    fs::create_dir_all(directory)?;

    let mut stored = Vec::new();
    for format in formats {
        let path = directory.join(format!("{}{}.{}", FILE_PREFIX, timestamp, format.extension()));
        fs::write(&path, format.serialize(report)?)?;
        stored.push(path);
    }
    Ok(stored)
}
