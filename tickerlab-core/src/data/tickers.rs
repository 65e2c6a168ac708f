//! Ticker list loading from index CSV files.

use crate::domain::TickerRecord;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Accepted names per required column: canonical first, pre-rename second.
const SYMBOL_COLUMNS: [&str; 2] = ["Symbol", "Ticker"];
const SECURITY_COLUMNS: [&str; 2] = ["Security", "Company"];

#[derive(Debug, Error)]
pub enum TickerFileError {
    #[error("ticker file '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("ticker file '{}' is missing required columns: {}", .path.display(), .missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    #[error("failed to read ticker file: {0}")]
    Csv(#[from] csv::Error),
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|h| h.trim() == *name))
}

/// Read tickers from an index CSV.
///
/// Requires `Symbol`/`Security` (or `Ticker`/`Company`) columns. Rows with an
/// empty symbol or name are skipped with a warning. Symbols are normalized and
/// deduplicated (first occurrence wins); the result is sorted by symbol.
pub fn read_tickers(path: &Path) -> Result<Vec<TickerRecord>, TickerFileError> {
    if !path.is_file() {
        return Err(TickerFileError::NotFound(path.to_path_buf()));
    }
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = rdr.headers()?.clone();
    let symbol_col = find_column(&headers, &SYMBOL_COLUMNS);
    let security_col = find_column(&headers, &SECURITY_COLUMNS);
    let (Some(symbol_col), Some(security_col)) = (symbol_col, security_col) else {
        let mut missing = Vec::new();
        if symbol_col.is_none() {
            missing.push(SYMBOL_COLUMNS[0].to_string());
        }
        if security_col.is_none() {
            missing.push(SECURITY_COLUMNS[0].to_string());
        }
        return Err(TickerFileError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        });
    };

    let mut by_symbol: BTreeMap<String, TickerRecord> = BTreeMap::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let symbol = record.get(symbol_col).unwrap_or("").trim();
        let security = record.get(security_col).unwrap_or("").trim();
        if symbol.is_empty() || security.is_empty() {
            // Row numbers are 1-based and count the header line.
            tracing::warn!(path = %path.display(), row = i + 2, "skipping row without symbol or security");
            continue;
        }
        let ticker = TickerRecord::new(symbol, security);
        by_symbol.entry(ticker.symbol.clone()).or_insert(ticker);
    }

    Ok(by_symbol.into_values().collect())
}
