//! Alpha Vantage `NEWS_SENTIMENT` provider.
//!
//! The free tier allows 5 calls per minute; pacing is the caller's concern. When
//! the quota is exhausted the API still answers 200, with a top-level `Note`
//! (older plans) or `Information` (current plans) message instead of `feed`.

use super::provider::{DataError, NewsItem, NewsResponse, SentimentProvider};
use crate::dates::DateRange;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Top-level keys the provider uses to signal an exhausted quota.
pub const QUOTA_MARKERS: [&str; 2] = ["Note", "Information"];

pub struct AlphaVantageProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    limit: u32,
}

impl AlphaVantageProvider {
    pub fn new(api_key: impl Into<String>, limit: u32, timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            limit,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Query parameters for one ticker. The key is last so logs can truncate it.
    pub fn query_params(&self, symbol: &str, range: DateRange) -> Vec<(&'static str, String)> {
        let (time_from, time_to) = range.sentiment_window();
        vec![
            ("function", "NEWS_SENTIMENT".to_string()),
            ("tickers", symbol.to_string()),
            ("time_from", time_from),
            ("time_to", time_to),
            ("limit", self.limit.to_string()),
            ("apikey", self.api_key.clone()),
        ]
    }
}

/// Parse a response body.
///
/// A quota marker wins over any `feed` present. A missing or null `feed` is an
/// empty feed; a `feed` that is not an array of items is a format change.
pub fn parse_news_response(body: &str) -> Result<NewsResponse, DataError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| DataError::ResponseFormatChanged(format!("news body is not JSON: {e}")))?;
    let obj = value
        .as_object()
        .ok_or_else(|| DataError::ResponseFormatChanged("news body is not an object".into()))?;

    for marker in QUOTA_MARKERS {
        if let Some(msg) = obj.get(marker) {
            let text = msg.as_str().map(str::to_string).unwrap_or_else(|| msg.to_string());
            return Ok(NewsResponse::QuotaExceeded(text));
        }
    }

    match obj.get("feed") {
        None | Some(Value::Null) => Ok(NewsResponse::Feed(Vec::new())),
        Some(feed) => {
            let items: Vec<NewsItem> = serde_json::from_value(feed.clone())
                .map_err(|e| DataError::ResponseFormatChanged(format!("unexpected feed shape: {e}")))?;
            Ok(NewsResponse::Feed(items))
        }
    }
}

impl SentimentProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        "alpha_vantage"
    }

    fn fetch_news(&self, symbol: &str, range: DateRange) -> Result<NewsResponse, DataError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&self.query_params(symbol, range))
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
                url: self.base_url.clone(),
            });
        }
        let body = resp.text()?;
        parse_news_response(&body)
    }
}
