//! TickerLab Core: domain records, providers, dates, retry.
//!
//! This crate holds everything the jobs share:
//! - Domain records (tickers, daily closes, sentiment items)
//! - Strict date parsing and provider-specific date renderings
//! - Provider traits with Yahoo, Alpha Vantage and HTML page implementations
//! - Index table scraping, normalization and diff-on-write
//! - Gemini chat client behind the `ChatModel` trait
//! - Retry with exponential backoff

pub mod data;
pub mod dates;
pub mod domain;
pub mod footnote;
pub mod llm;
pub mod retry;

pub use dates::{parse_date, DateError, DateRange};
pub use domain::{PriceObservation, SentimentItem, TickerRecord};
pub use retry::{retry_with_backoff, RetryPolicy};
