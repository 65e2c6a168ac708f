//! Serializable application configuration.
//!
//! Loaded from a TOML file; every field has a default so an absent file, or an
//! empty one, reproduces the stock setup (Dow Jones input, 12 s sentiment pacing,
//! three chat attempts).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tickerlab_core::data::IndexSource;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "tickerlab.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub index: IndexConfig,
    pub prices: PriceConfig,
    pub sentiment: SentimentConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Comma/newline separated URLs, paired in order with the known index files.
    pub link_file: PathBuf,
    /// JSON header capture; only `User-*` headers are sent.
    pub headers_file: PathBuf,
    pub output_dir: PathBuf,
    pub timeout_secs: u64,
    /// Explicit sources. When non-empty the link file is not read.
    pub sources: Vec<IndexSource>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            link_file: "link.txt".into(),
            headers_file: "headers145.json".into(),
            output_dir: ".".into(),
            timeout_secs: 3,
            sources: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PriceConfig {
    pub input_file: PathBuf,
    pub output_dir: PathBuf,
    /// Attempts per ticker. 1 means a failed ticker is dropped without retry.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            input_file: "Dow-Jones-Industrial-Average.csv".into(),
            output_dir: ".".into(),
            max_attempts: 1,
            base_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SentimentConfig {
    pub input_file: PathBuf,
    pub api_key_file: PathBuf,
    pub output_dir: PathBuf,
    /// Output is `<prefix><YYYYmmdd-HHMM>.csv`.
    pub output_prefix: String,
    /// Maximum news items per ticker.
    pub limit: u32,
    /// Pause between tickers; 12 s keeps under 5 calls per minute.
    pub delay_secs: u64,
    pub timeout_secs: u64,
    pub base_url: String,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            input_file: "Dow-Jones-Industrial-Average.csv".into(),
            api_key_file: "alpha-api.txt".into(),
            output_dir: ".".into(),
            output_prefix: "sentiment-data".into(),
            limit: 50,
            delay_secs: 12,
            timeout_secs: 3,
            base_url: tickerlab_core::data::alpha_vantage::DEFAULT_BASE_URL.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChatConfig {
    pub api_key_file: PathBuf,
    pub model: String,
    pub base_url: String,
    /// Sentiment CSV consulted by `news` turns. Required when such a turn runs.
    pub sentiment_file: PathBuf,
    /// Price CSV consulted by dated `news` turns, typically a
    /// `<ABBR>_<start>_<end>.csv` written by the price job. Unset means no
    /// price section; a configured file that is missing is skipped with a warning.
    pub price_file: Option<PathBuf>,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub timeout_secs: u64,
    pub transcript_dir: PathBuf,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key_file: "api-key.txt".into(),
            model: tickerlab_core::llm::gemini::DEFAULT_MODEL.into(),
            base_url: tickerlab_core::llm::gemini::DEFAULT_BASE_URL.into(),
            sentiment_file: "sentiment-data.csv".into(),
            price_file: None,
            max_attempts: 3,
            base_delay_ms: 2000,
            timeout_secs: 60,
            transcript_dir: ".".into(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load `path` if given (it must exist), else [`DEFAULT_CONFIG_FILE`] if
    /// present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sentiment.limit == 0 {
            return Err(ConfigError::Invalid("sentiment.limit must be at least 1".into()));
        }
        if self.sentiment.output_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("sentiment.output_prefix must not be empty".into()));
        }
        if self.chat.max_attempts == 0 {
            return Err(ConfigError::Invalid("chat.max_attempts must be at least 1".into()));
        }
        if self.prices.max_attempts == 0 {
            return Err(ConfigError::Invalid("prices.max_attempts must be at least 1".into()));
        }
        if self.chat.model.trim().is_empty() {
            return Err(ConfigError::Invalid("chat.model must not be empty".into()));
        }
        Ok(())
    }
}
