//! Market-data context for `news` turns.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;
use tickerlab_core::dates::compact;
use tickerlab_core::domain::{PriceObservation, SentimentItem};

use crate::export::{read_prices_csv, read_sentiment_csv, ExportError};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("cannot load news data: {0}")]
    Sentiment(#[source] ExportError),

    #[error("cannot load price data: {0}")]
    Prices(#[source] ExportError),
}

/// Files consulted for context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSources {
    pub sentiment_file: PathBuf,
    /// Consulted only for dated turns; a missing file is skipped with a warning.
    pub price_file: Option<PathBuf>,
}

impl ContextSources {
    /// Build the prompt forwarded to the model for `news [date] question`.
    ///
    /// With a date, sentiment rows published that day and price rows for that
    /// day are included. Without one, every sentiment row is. Sentinel rows are
    /// never included.
    pub fn build_prompt(&self, date: Option<NaiveDate>, question: &str) -> Result<String, ContextError> {
        let sentiment = read_sentiment_csv(&self.sentiment_file).map_err(ContextError::Sentiment)?;
        let sentiment: Vec<&SentimentItem> = match date {
            Some(d) => {
                let day = compact(d);
                sentiment.iter().filter(|s| s.published_on(&day)).collect()
            }
            None => sentiment.iter().filter(|s| !s.is_no_data()).collect(),
        };

        let prices = match (date, &self.price_file) {
            (Some(d), Some(path)) => match read_prices_csv(path) {
                Ok(rows) => Some(rows.into_iter().filter(|p| p.date == d).collect::<Vec<_>>()),
                Err(ExportError::NotFound(p)) => {
                    tracing::warn!(path = %p.display(), "price file missing, answering without prices");
                    None
                }
                Err(e) => return Err(ContextError::Prices(e)),
            },
            _ => None,
        };

        Ok(format_prompt(date, &sentiment, prices.as_deref(), question))
    }
}

/// Plain-text context block followed by the question.
pub fn format_prompt(
    date: Option<NaiveDate>,
    sentiment: &[&SentimentItem],
    prices: Option<&[PriceObservation]>,
    question: &str,
) -> String {
    let mut out = String::new();
    let scope = date.map(|d| format!(" for {d}")).unwrap_or_default();
    let _ = writeln!(
        out,
        "Answer using the stock market data{scope} provided below."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Sentiment data (Ticker | Security | Title | Score | Label):");
    if sentiment.is_empty() {
        let _ = writeln!(out, "(no rows)");
    }
    for s in sentiment {
        let _ = writeln!(
            out,
            "{} | {} | {} | {} | {}",
            s.ticker,
            s.security,
            s.title,
            s.score.map(|v| v.to_string()).unwrap_or_default(),
            s.label.as_deref().unwrap_or("")
        );
    }
    if let Some(prices) = prices {
        let _ = writeln!(out);
        let _ = writeln!(out, "Price data (Ticker | Company Name | Close):");
        if prices.is_empty() {
            let _ = writeln!(out, "(no rows)");
        }
        for p in prices {
            let _ = writeln!(out, "{} | {} | {}", p.ticker, p.company, p.close);
        }
    }
    let _ = writeln!(out, "End of data");
    let _ = write!(out, "Question: {question}");
    out
}
