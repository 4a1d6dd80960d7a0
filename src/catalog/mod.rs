// SPDX-License-Identifier: PMPL-1.0-or-later

//! Vulnerability pattern catalog
//!
//! The catalog is a CSV table with the header
//! `pattern,issue,description,severity,example_fix`. Rows are kept in file
//! order because that order is the order matches are reported in.

use crate::types::PatternRule;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Location of the bundled catalog, relative to the install or crate root
pub const BUNDLED_CATALOG: &str = "datasets/vulnerabilities.csv";

/// Columns a catalog file must provide
pub const REQUIRED_COLUMNS: [&str; 5] = ["pattern", "issue", "description", "severity", "example_fix"];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog not found or unreadable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog at {path} is missing columns: {}", missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    #[error("catalog at {path} has a malformed row: {source}")]
    MalformedRow {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Absolute path of the bundled catalog.
///
/// A `datasets/` directory next to the running binary wins; otherwise the
/// copy in the crate source tree is used. The working directory never
/// matters.
pub fn default_catalog_path() -> PathBuf {
    let beside_binary = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(BUNDLED_CATALOG)));
    match beside_binary {
        Some(path) if path.is_file() => path,
        _ => Path::new(env!("CARGO_MANIFEST_DIR")).join(BUNDLED_CATALOG),
    }
}

/// Ordered, read-only collection of pattern rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    rules: Vec<PatternRule>,
}

impl Catalog {
    pub fn new(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    /// Load a catalog from a CSV file on disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CatalogError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_reader(file, path)?;
        debug!("Loaded {} catalog rules from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Parse catalog rows from any reader; `origin` is only used in errors.
    pub fn from_reader<R: std::io::Read>(reader: R, origin: &Path) -> Result<Self, CatalogError> {
        let malformed = |source: csv::Error| CatalogError::MalformedRow {
            path: origin.to_path_buf(),
            source,
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers = csv_reader.headers().map_err(malformed)?.clone();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|column| !headers.iter().any(|h| h.trim() == **column))
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CatalogError::MissingColumns {
                path: origin.to_path_buf(),
                missing,
            });
        }

        // Header names may carry stray whitespace; normalise before serde maps them.
        let trimmed: csv::StringRecord = headers.iter().map(str::trim).collect();
        csv_reader.set_headers(trimmed);

        let mut rules = Vec::new();
        for row in csv_reader.deserialize::<PatternRule>() {
            rules.push(row.map_err(malformed)?);
        }

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatternRule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a PatternRule;
    type IntoIter = std::slice::Iter<'a, PatternRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
