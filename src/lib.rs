// SPDX-License-Identifier: PMPL-1.0-or-later

//! Snippet-Audit: syntax, style and known-vulnerability checks for Python
//! code snippets.
//!
//! PIPELINE:
//! 1. **Syntax**: parse with the tree-sitter Python grammar and locate the
//!    first error.
//! 2. **Style**: line length, mixed indentation, trailing whitespace.
//! 3. **Catalog match**: literal substring search for every row of the
//!    vulnerability catalog.
//! 4. **Suggestions**: generic and keyword-triggered advice.
//!
//! The pipeline is exposed over HTTP (`server`) and as a batch CLI (`sweep`).

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod report;
pub mod server;
pub mod storage;
pub mod sweep;
pub mod types;

pub use analysis::{analyze, analyze_code};
pub use catalog::{Catalog, CatalogError};
