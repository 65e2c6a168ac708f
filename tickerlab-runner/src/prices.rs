//! Daily close range query over a ticker list.

use std::path::{Path, PathBuf};

use tickerlab_core::data::{FetchProgress, PriceProvider};
use tickerlab_core::dates::DateRange;
use tickerlab_core::domain::{sort_observations, PriceObservation, TickerRecord};

use crate::export::{write_prices_csv, ExportError};

/// Fetch daily closes for every ticker over `[start, end]`.
///
/// Dates must be strict `YYYY-MM-DD`; otherwise (or if `start > end`) the
/// result is empty and the provider is never called. A ticker whose fetch
/// fails is logged and contributes no rows. Rows come back sorted by ticker,
/// then date.
pub fn fetch_prices_by_range(
    provider: &dyn PriceProvider,
    tickers: &[TickerRecord],
    start: &str,
    end: &str,
    progress: &dyn FetchProgress,
) -> Vec<PriceObservation> {
    let range = match DateRange::parse(start, end) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "price range rejected");
            return Vec::new();
        }
    };

    let total = tickers.len();
    let mut succeeded = 0;
    let mut failed = 0;
    let mut rows = Vec::new();

    for (i, ticker) in tickers.iter().enumerate() {
        progress.on_start(&ticker.symbol, i, total);
        let result = provider.fetch_closes(&ticker.symbol, range);
        match result {
            Ok(closes) => {
                if closes.is_empty() {
                    tracing::warn!(
                        symbol = %ticker.symbol,
                        start,
                        end,
                        "no data in range"
                    );
                }
                let n = closes.len();
                rows.extend(closes.into_iter().map(|c| PriceObservation {
                    ticker: ticker.symbol.clone(),
                    company: ticker.security.clone(),
                    date: c.date,
                    close: c.close,
                }));
                progress.on_complete(&ticker.symbol, i, total, &Ok(n));
                succeeded += 1;
            }
            Err(e) => {
                tracing::error!(symbol = %ticker.symbol, provider = provider.name(), error = %e, "price fetch failed");
                progress.on_complete(&ticker.symbol, i, total, &Err(e));
                failed += 1;
            }
        }
    }

    progress.on_batch_complete(succeeded, failed, total);
    sort_observations(&mut rows);
    rows
}

/// Short tag for an input file: the first character, every upper-case
/// character, and every character after a `-` of the file stem.
///
/// `Dow-Jones-Industrial-Average.csv` gives `DJIA`, `Nasdaq-100.csv` gives `N1`.
pub fn abbreviate(input: &Path) -> String {
    let stem = input
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.split('.').next().unwrap_or(n))
        .unwrap_or("prices");
    let chars: Vec<char> = stem.chars().collect();
    chars
        .iter()
        .enumerate()
        .filter(|&(i, c)| i == 0 || c.is_uppercase() || chars[i - 1] == '-')
        .map(|(_, c)| *c)
        .collect()
}

/// `<dir>/<ABBR>_<start>_<end>.csv`
pub fn output_path(dir: &Path, input: &Path, start: &str, end: &str) -> PathBuf {
    dir.join(format!("{}_{start}_{end}.csv", abbreviate(input)))
}

/// Fetch and, when anything came back, write the price file.
///
/// Returns the written path, or `None` when there was nothing to write.
pub fn fetch_and_write(
    provider: &dyn PriceProvider,
    tickers: &[TickerRecord],
    input: &Path,
    output_dir: &Path,
    start: &str,
    end: &str,
    progress: &dyn FetchProgress,
) -> Result<Option<PathBuf>, ExportError> {
    let rows = fetch_prices_by_range(provider, tickers, start, end, progress);
    if rows.is_empty() {
        return Ok(None);
    }
    let path = output_path(output_dir, input, start, end);
    write_prices_csv(&path, &rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "price file written");
    Ok(Some(path))
}
