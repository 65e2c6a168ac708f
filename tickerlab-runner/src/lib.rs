//! TickerLab Runner: the jobs behind each CLI command.
//!
//! This crate builds on `tickerlab-core` to provide:
//! - TOML configuration and API key loading
//! - Index refresh (fetch, normalize, write on change)
//! - Price range fetch and dated CSV output
//! - Rate-limited news-sentiment loop with sentinel rows and quota stop
//! - Chat session with CSV context injection, retry and transcript

pub mod chat;
pub mod config;
pub mod credentials;
pub mod export;
pub mod index_refresh;
pub mod prices;
pub mod sentiment;

pub use chat::{run_repl, ChatSession, ContextSources, Transcript, TurnOutcome};
pub use config::{AppConfig, ConfigError};
pub use credentials::{read_api_key, CredentialError};
pub use export::ExportError;
pub use index_refresh::{refresh_all, resolve_sources, RefreshOutcome, RefreshReport};
pub use prices::fetch_prices_by_range;
pub use sentiment::{run_sentiment_loop, SentimentSummary};
