use serde::{Deserialize, Serialize};

/// Title written for a ticker the provider returned no news for.
pub const NO_DATA_TITLE: &str = "NO_DATA";

/// One news item with its provider-computed sentiment, as written to the sentiment CSV.
///
/// Only `ticker`, `security` and `title` are guaranteed; the sentinel row leaves
/// the rest empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentItem {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Security")]
    pub security: String,
    #[serde(rename = "Title")]
    pub title: String,
    /// Provider timestamp, `YYYYMMDDTHHMMSS`.
    #[serde(rename = "Time")]
    pub time: Option<String>,
    #[serde(rename = "Score", deserialize_with = "csv::invalid_option")]
    pub score: Option<f64>,
    #[serde(rename = "Label")]
    pub label: Option<String>,
    #[serde(rename = "URL")]
    pub url: Option<String>,
}

impl SentimentItem {
    /// Marker row meaning "checked, nothing found".
    pub fn no_data(ticker: &str, security: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            security: security.to_string(),
            title: NO_DATA_TITLE.to_string(),
            time: None,
            score: None,
            label: None,
            url: None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.title == NO_DATA_TITLE && self.time.is_none()
    }

    /// True if the publish time falls on the given compact date (`YYYYMMDD`).
    pub fn published_on(&self, compact_date: &str) -> bool {
        self.time
            .as_deref()
            .is_some_and(|t| t.starts_with(compact_date))
    }
}
