//! Data sources: provider traits, HTTP providers, and file formats.

pub mod alpha_vantage;
pub mod index_table;
pub mod provider;
pub mod sources;
pub mod tickers;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageProvider;
pub use index_table::{parse_html_table, write_if_changed, HttpPageFetcher, Table, WriteOutcome};
pub use provider::{
    DailyClose, DataError, FetchProgress, NewsItem, NewsResponse, Page, PageFetcher,
    PriceProvider, RequestHeaders, SentimentProvider, SilentProgress, StdoutProgress,
};
pub use sources::{known_sources, IndexSource};
pub use tickers::{read_tickers, TickerFileError};
pub use yahoo::YahooProvider;
