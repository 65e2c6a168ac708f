//! Rate-limited news-sentiment loop.
//!
//! One request per ticker, strictly sequential, with a fixed pause between
//! tickers. Each ticker produces its news rows or a single `NO_DATA` sentinel,
//! appended to the run's CSV as soon as it is known. A quota signal stops the
//! run; everything already appended stays on disk.
//!
//! A ticker whose request fails is logged and skipped without retry or marker,
//! and the pause after it is skipped too.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDateTime;
use tickerlab_core::data::{DataError, FetchProgress, NewsItem, NewsResponse, SentimentProvider};
use tickerlab_core::dates::DateRange;
use tickerlab_core::domain::{SentimentItem, TickerRecord};

use crate::export::append_sentiment_rows;

/// `<dir>/<prefix><YYYYmmdd-HHMM>.csv`
pub fn output_path(dir: &Path, prefix: &str, started: NaiveDateTime) -> PathBuf {
    dir.join(format!("{prefix}{}.csv", started.format("%Y%m%d-%H%M")))
}

/// Rows for one ticker: its news items, or exactly one sentinel if there are none.
pub fn rows_for_ticker(ticker: &TickerRecord, feed: Vec<NewsItem>) -> Vec<SentimentItem> {
    if feed.is_empty() {
        return vec![SentimentItem::no_data(&ticker.symbol, &ticker.security)];
    }
    feed.into_iter()
        .map(|item| SentimentItem {
            ticker: ticker.symbol.clone(),
            security: ticker.security.clone(),
            title: item.title.unwrap_or_default(),
            time: item.time_published,
            score: item.overall_sentiment_score,
            label: item.overall_sentiment_label,
            url: item.url,
        })
        .collect()
}

/// Append one ticker's rows, returning how many were written.
fn write_ticker_rows(ticker: &TickerRecord, feed: Vec<NewsItem>, out_path: &Path) -> Result<usize, DataError> {
    let rows = rows_for_ticker(ticker, feed);
    append_sentiment_rows(out_path, &rows).map_err(|e| {
        tracing::error!(symbol = %ticker.symbol, path = %out_path.display(), error = %e, "failed to append rows");
        DataError::Other(format!("write failed: {e}"))
    })?;
    Ok(rows.len())
}

/// Outcome of a sentiment run.
#[derive(Debug, Default)]
pub struct SentimentSummary {
    pub total: usize,
    /// Tickers whose rows (news or sentinel) were produced.
    pub processed: usize,
    pub rows_written: usize,
    /// Tickers dropped after a request or write failure.
    pub failed: Vec<(String, DataError)>,
    /// Provider quota message, if the run stopped early.
    pub halted_on_quota: Option<String>,
}

impl SentimentSummary {
    pub fn completed(&self) -> bool {
        self.halted_on_quota.is_none() && self.failed.is_empty()
    }
}

/// Run the loop, sleeping `delay` between tickers.
pub fn run_sentiment_loop(
    provider: &dyn SentimentProvider,
    tickers: &[TickerRecord],
    range: DateRange,
    out_path: &Path,
    delay: Duration,
    progress: &dyn FetchProgress,
) -> SentimentSummary {
    run_sentiment_loop_with_sleep(provider, tickers, range, out_path, delay, progress, std::thread::sleep)
}

/// Same as [`run_sentiment_loop`] with an injectable sleep.
pub fn run_sentiment_loop_with_sleep<S: FnMut(Duration)>(
    provider: &dyn SentimentProvider,
    tickers: &[TickerRecord],
    range: DateRange,
    out_path: &Path,
    delay: Duration,
    progress: &dyn FetchProgress,
    mut sleep: S,
) -> SentimentSummary {
    let total = tickers.len();
    let mut summary = SentimentSummary {
        total,
        ..Default::default()
    };
    tracing::info!(tickers = total, provider = provider.name(), "fetching news sentiment");

    for (i, ticker) in tickers.iter().enumerate() {
        progress.on_start(&ticker.symbol, i, total);

        let feed = match provider.fetch_news(&ticker.symbol, range) {
            Ok(NewsResponse::Feed(feed)) => Ok(feed),
            Ok(NewsResponse::QuotaExceeded(msg)) => {
                tracing::warn!(symbol = %ticker.symbol, message = %msg, "API limit reached, stopping");
                summary.halted_on_quota = Some(msg);
                break;
            }
            Err(e) => {
                tracing::error!(symbol = %ticker.symbol, error = %e, "news request failed, skipping");
                Err(e)
            }
        };
        let requested = feed.is_ok();

        let result = feed.and_then(|feed| write_ticker_rows(ticker, feed, out_path));
        progress.on_complete(&ticker.symbol, i, total, &result);

        match result {
            Ok(n) => {
                summary.rows_written += n;
                summary.processed += 1;
            }
            Err(e) => summary.failed.push((ticker.symbol.clone(), e)),
        }

        // No pause after a failed request.
        if !requested {
            continue;
        }
        if i + 1 < total && !delay.is_zero() {
            sleep(delay);
        }
    }

    progress.on_batch_complete(summary.processed, summary.failed.len(), total);
    summary
}
