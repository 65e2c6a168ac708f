//! Yahoo Finance price provider.
//!
//! Fetches daily closes from Yahoo's v8 chart API. Yahoo has no official API and
//! is subject to unannounced format changes; parsing is kept separate from
//! transport so fixture bodies can be tested directly.

use super::provider::{DailyClose, DataError, PriceProvider};
use crate::dates::DateRange;
use crate::retry::{retry_with_backoff, RetryPolicy};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

const CHART_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Option<Vec<Option<f64>>>,
}

/// Yahoo Finance price provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl YahooProvider {
    pub fn new(retry: RetryPolicy) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: CHART_BASE_URL.to_string(),
            retry,
        })
    }

    /// Point the provider at a different chart endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the chart API URL for a symbol and date range.
    fn chart_url(&self, symbol: &str, range: DateRange) -> String {
        let start_ts = range.start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = range
            .end
            .and_hms_opt(23, 59, 59)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(start_ts);
        format!(
            "{}/{symbol}?period1={start_ts}&period2={end_ts}&interval=1d",
            self.base_url
        )
    }

    fn fetch_once(&self, url: &str, symbol: &str, range: DateRange) -> Result<Vec<DailyClose>, DataError> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(DataError::RateLimited {
                retry_after_secs: retry_after,
            });
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(DataError::AuthenticationRequired(
                "Yahoo Finance requires authentication".into(),
            ));
        }
        // 404 still carries a chart error body naming the symbol.
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp.text()?;
        parse_chart(symbol, &body, range)
    }
}

/// Parse a chart API body into closes within `range`.
///
/// A range with no trading days parses to an empty list.
pub fn parse_chart(symbol: &str, body: &str, range: DateRange) -> Result<Vec<DailyClose>, DataError> {
    let resp: ChartResponse = serde_json::from_str(body).map_err(|e| {
        DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
    })?;

    let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
        Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
        Some(err) => DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description)),
        None => DataError::ResponseFormatChanged("empty result with no error".into()),
    })?;

    let Some(data) = result.into_iter().next() else {
        return Err(DataError::ResponseFormatChanged("result array is empty".into()));
    };
    let Some(timestamps) = data.timestamp else {
        return Ok(Vec::new());
    };
    let closes = data
        .indicators
        .quote
        .into_iter()
        .next()
        .and_then(|q| q.close)
        .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

    let mut out = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date: NaiveDate = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;

        // Null close: holiday or halted session.
        let Some(close) = closes.get(i).copied().flatten() else {
            continue;
        };
        if date < range.start || date > range.end {
            continue;
        }
        out.push(DailyClose { date, close });
    }
    Ok(out)
}

impl PriceProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_closes(&self, symbol: &str, range: DateRange) -> Result<Vec<DailyClose>, DataError> {
        let url = self.chart_url(symbol, range);
        retry_with_backoff(&self.retry, DataError::is_transient, |_| {
            self.fetch_once(&url, symbol, range)
        })
    }
}
