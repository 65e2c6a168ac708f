//! Provider traits and structured error types.
//!
//! Each external source (Yahoo chart API, Alpha Vantage news sentiment, HTML
//! index pages) sits behind a trait so jobs can be driven by in-memory fakes in
//! tests. Providers only fetch and parse; writing files is the caller's job.

use crate::dates::DateRange;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Structured error types for provider operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("table {index} not found in page ({found} tables present)")]
    TableNotFound { index: usize, found: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// Failures worth retrying: connectivity, throttling, server-side errors.
    pub fn is_transient(&self) -> bool {
        match self {
            DataError::NetworkUnreachable(_) | DataError::RateLimited { .. } => true,
            DataError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            DataError::ResponseFormatChanged(e.to_string())
        } else {
            DataError::NetworkUnreachable(e.to_string())
        }
    }
}

/// One trading day's close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: f64,
}

/// Source of historical daily closes.
pub trait PriceProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Daily closes for `symbol` within `range`, both ends inclusive.
    ///
    /// Days the provider has no close for are omitted, never filled.
    fn fetch_closes(&self, symbol: &str, range: DateRange) -> Result<Vec<DailyClose>, DataError>;
}

/// A single news item as returned under the provider's `feed` key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewsItem {
    pub title: Option<String>,
    pub time_published: Option<String>,
    pub overall_sentiment_score: Option<f64>,
    pub overall_sentiment_label: Option<String>,
    pub url: Option<String>,
}

/// Parsed news-sentiment response.
#[derive(Debug, Clone, PartialEq)]
pub enum NewsResponse {
    /// Items for the ticker, possibly empty.
    Feed(Vec<NewsItem>),
    /// The provider signalled its call quota is exhausted; carries its message.
    QuotaExceeded(String),
}

/// Source of per-ticker news sentiment.
pub trait SentimentProvider {
    fn name(&self) -> &str;

    fn fetch_news(&self, symbol: &str, range: DateRange) -> Result<NewsResponse, DataError>;
}

/// Request headers sent with index page downloads.
pub type RequestHeaders = BTreeMap<String, String>;

/// A fetched page: status plus body, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

/// Source of HTML pages.
pub trait PageFetcher {
    /// GET `url`. Non-2xx statuses are returned as pages, not errors.
    fn get(&self, url: &str, headers: &RequestHeaders) -> Result<Page, DataError>;
}

/// Progress callback for multi-ticker operations.
pub trait FetchProgress {
    /// Called when starting to fetch a ticker.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a ticker completes; `Ok` carries the row count.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: &Result<usize, DataError>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl FetchProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {symbol}...", index + 1, total);
    }

    fn on_complete(
        &self,
        symbol: &str,
        _index: usize,
        _total: usize,
        result: &Result<usize, DataError>,
    ) {
        match result {
            Ok(rows) => println!("  OK: {symbol} ({rows} rows)"),
            Err(e) => println!("  FAIL: {symbol}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nFetch complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}

/// Progress reporter that reports nothing.
pub struct SilentProgress;

impl FetchProgress for SilentProgress {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}
    fn on_complete(&self, _: &str, _: usize, _: usize, _: &Result<usize, DataError>) {}
    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(DataError::NetworkUnreachable("x".into()).is_transient());
        assert!(DataError::RateLimited { retry_after_secs: 1 }.is_transient());
        assert!(DataError::HttpStatus { status: 503, url: "u".into() }.is_transient());
        assert!(!DataError::HttpStatus { status: 404, url: "u".into() }.is_transient());
        assert!(!DataError::SymbolNotFound { symbol: "X".into() }.is_transient());
    }
}
