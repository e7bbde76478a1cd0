//! Parser traits and implementations for billing exports

mod delimited;

pub use delimited::DelimitedParser;

use crate::types::{CostRecord, OptiscaleError, Result};
use std::path::{Path, PathBuf};

/// Rows parsed from one billing export, plus the header metadata the
/// profile reports back to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBilling {
    pub records: Vec<CostRecord>,
    /// Normalized header names in file order
    pub detected_columns: Vec<String>,
    pub amount_column: String,
}

impl ParsedBilling {
    /// Append another export. Header metadata is unioned; the first amount
    /// column name is kept.
    pub fn merge(&mut self, other: ParsedBilling) {
        for col in other.detected_columns {
            if !self.detected_columns.contains(&col) {
                self.detected_columns.push(col);
            }
        }
        self.records.extend(other.records);
    }
}

/// Trait for parsing spend data out of a billing export
pub trait BillingParser: Send + Sync {
    /// Parser name (e.g., "csv")
    fn name(&self) -> &str;

    /// Parse in-memory export text
    fn parse_str(&self, text: &str) -> Result<ParsedBilling>;

    /// Read and parse a single file
    fn parse_file(&self, path: &Path) -> Result<ParsedBilling> {
        let text = std::fs::read_to_string(path)?;
        self.parse_str(&text).map_err(|e| match e {
            OptiscaleError::MalformedInput { line, reason } => OptiscaleError::MalformedInput {
                line,
                reason: format!("{}: {}", path.display(), reason),
            },
            other => other,
        })
    }
}

/// Registry of available parsers
pub struct ParserRegistry {
    parsers: Vec<Box<dyn BillingParser>>,
}

impl ParserRegistry {
    /// Create a new registry with default parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(DelimitedParser::csv()),
                Box::new(DelimitedParser::tsv()),
            ],
        }
    }

    /// Get all registered parsers
    pub fn parsers(&self) -> &[Box<dyn BillingParser>] {
        &self.parsers
    }

    /// Find a parser by name
    pub fn get(&self, name: &str) -> Option<&dyn BillingParser> {
        self.parsers
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    /// Pick a parser from the file extension; anything unrecognised is CSV
    pub fn for_path(&self, path: &Path) -> &dyn BillingParser {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let name = match ext.as_deref() {
            Some("tsv") | Some("tab") => "tsv",
            _ => "csv",
        };
        self.get(name)
            .unwrap_or_else(|| self.parsers[0].as_ref())
    }

    /// Parse several files and merge them into one row set.
    /// Any failing file fails the whole call.
    pub fn parse_files(&self, paths: &[PathBuf]) -> Result<ParsedBilling> {
        let mut merged: Option<ParsedBilling> = None;
        for path in paths {
            let parsed = self.for_path(path).parse_file(path)?;
            match merged.as_mut() {
                Some(m) => m.merge(parsed),
                None => merged = Some(parsed),
            }
        }
        merged.ok_or_else(|| OptiscaleError::InvalidArgument("no billing files given".into()))
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Expand glob patterns into concrete file paths. Plain paths pass through
/// unchanged so a missing file surfaces as an I/O error later.
pub fn expand_paths(patterns: &[String]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for pattern in patterns {
        let is_glob = pattern.contains(['*', '?', '[']);
        if !is_glob {
            out.push(PathBuf::from(pattern));
            continue;
        }
        match glob::glob(pattern) {
            Ok(paths) => {
                let mut matched: Vec<PathBuf> = paths.filter_map(|e| e.ok()).collect();
                if matched.is_empty() {
                    tracing::warn!(%pattern, "glob matched no files");
                }
                matched.sort();
                out.extend(matched);
            }
            Err(e) => tracing::warn!(%pattern, error = %e, "invalid glob pattern"),
        }
    }
    out
}
