//! Index constituent refresh: fetch, normalize, write on change.

use std::path::Path;

use tickerlab_core::data::sources::{known_sources, read_link_file};
use tickerlab_core::data::{
    parse_html_table, write_if_changed, DataError, IndexSource, PageFetcher, RequestHeaders,
    WriteOutcome,
};

use crate::config::IndexConfig;

/// What happened to one index file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Written,
    Unchanged,
    /// Download, parse or write failed; the existing file is untouched.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub file: String,
    pub outcome: RefreshOutcome,
}

/// Sources from config, or from the link file when config lists none.
pub fn resolve_sources(config: &IndexConfig) -> Result<Vec<IndexSource>, DataError> {
    if !config.sources.is_empty() {
        return Ok(config.sources.clone());
    }
    let links = read_link_file(&config.link_file)?;
    Ok(known_sources(&links))
}

/// Refresh one index file under `out_dir`.
pub fn refresh_index(
    fetcher: &dyn PageFetcher,
    headers: &RequestHeaders,
    source: &IndexSource,
    out_dir: &Path,
) -> RefreshOutcome {
    match try_refresh(fetcher, headers, source, out_dir) {
        Ok(WriteOutcome::Written) => RefreshOutcome::Written,
        Ok(WriteOutcome::Unchanged) => RefreshOutcome::Unchanged,
        Err(e) => RefreshOutcome::Failed(e.to_string()),
    }
}

fn try_refresh(
    fetcher: &dyn PageFetcher,
    headers: &RequestHeaders,
    source: &IndexSource,
    out_dir: &Path,
) -> Result<WriteOutcome, DataError> {
    let page = fetcher.get(&source.url, headers)?;
    if page.status != 200 {
        return Err(DataError::HttpStatus {
            status: page.status,
            url: source.url.clone(),
        });
    }
    let table = parse_html_table(&page.body, source.table_index)?.normalize();
    std::fs::create_dir_all(out_dir)?;
    write_if_changed(&out_dir.join(&source.file), &table)
}

/// Refresh every source in order. One failure never blocks the rest.
pub fn refresh_all(
    fetcher: &dyn PageFetcher,
    headers: &RequestHeaders,
    sources: &[IndexSource],
    out_dir: &Path,
) -> Vec<RefreshReport> {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            let outcome = refresh_index(fetcher, headers, source, out_dir);
            match &outcome {
                RefreshOutcome::Written => tracing::info!(file = %source.file, "index updated"),
                RefreshOutcome::Unchanged => tracing::info!(file = %source.file, "index unchanged"),
                RefreshOutcome::Failed(reason) => {
                    tracing::error!(index = i, file = %source.file, %reason, "index refresh failed")
                }
            }
            RefreshReport {
                file: source.file.clone(),
                outcome,
            }
        })
        .collect()
}
