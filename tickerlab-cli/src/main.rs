//! TickerLab CLI: index refresh, price and sentiment fetches, market chat.
//!
//! Commands:
//! - `index`: scrape index constituent tables and rewrite changed CSVs
//! - `prices`: fetch daily closes for every ticker over a date range
//! - `sentiment`: rate-limited news-sentiment fetch with quota stop
//! - `chat`: interactive model chat with `news [date] question` context turns

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tickerlab_core::data::sources::load_request_headers;
use tickerlab_core::data::{
    read_tickers, AlphaVantageProvider, HttpPageFetcher, StdoutProgress, YahooProvider,
};
use tickerlab_core::dates::DateRange;
use tickerlab_core::llm::GeminiChat;
use tickerlab_core::retry::RetryPolicy;
use tickerlab_runner::index_refresh::{refresh_all, resolve_sources, RefreshOutcome};
use tickerlab_runner::prices::fetch_and_write;
use tickerlab_runner::sentiment::{output_path, run_sentiment_loop};
use tickerlab_runner::{read_api_key, run_repl, AppConfig, ChatSession, ContextSources, Transcript};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tickerlab",
    about = "TickerLab CLI: stock index, price, sentiment and chat tools"
)]
struct Cli {
    /// TOML config file. Defaults to ./tickerlab.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh index constituent CSVs from their source pages.
    Index,
    /// Fetch daily closing prices for every ticker in the input file.
    Prices {
        /// Ticker CSV (Symbol, Security). Overrides `prices.input_file`.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Start date (YYYY-MM-DD). Prompted for when omitted.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Prompted for when omitted.
        #[arg(long)]
        end: Option<String>,
    },
    /// Fetch news sentiment for every ticker, one request every few seconds.
    Sentiment {
        /// Ticker CSV (Symbol, Security). Overrides `sentiment.input_file`.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Start date (YYYY-MM-DD). Prompted for when omitted.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Prompted for when omitted.
        #[arg(long)]
        end: Option<String>,
    },
    /// Chat with the model. `news [YYYY-MM-DD] <question>` adds market data.
    Chat,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Index => run_index(&config),
        Commands::Prices { input, start, end } => run_prices(&config, input, start, end),
        Commands::Sentiment { input, start, end } => run_sentiment(&config, input, start, end),
        Commands::Chat => run_chat(&config),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Use the flag if given, otherwise ask on stdin.
fn date_arg(value: Option<String>, label: &str) -> Result<String> {
    if let Some(v) = value {
        return Ok(v.trim().to_string());
    }
    print!("Enter the {label} date (YYYY-MM-DD): ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn date_range_args(start: Option<String>, end: Option<String>) -> Result<(String, String)> {
    let start = date_arg(start, "start")?;
    let end = date_arg(end, "end")?;
    DateRange::parse(&start, &end).with_context(|| format!("invalid date range {start}..{end}"))?;
    Ok((start, end))
}

fn run_index(config: &AppConfig) -> Result<()> {
    let cfg = &config.index;
    let sources = resolve_sources(cfg)
        .with_context(|| format!("cannot read link file '{}'", cfg.link_file.display()))?;
    if sources.is_empty() {
        bail!("no index sources configured (link file '{}' is empty)", cfg.link_file.display());
    }
    let headers = load_request_headers(&cfg.headers_file)
        .with_context(|| format!("cannot read header file '{}'", cfg.headers_file.display()))?;
    let fetcher = HttpPageFetcher::new(Duration::from_secs(cfg.timeout_secs))?;

    let reports = refresh_all(&fetcher, &headers, &sources, &cfg.output_dir);

    for report in &reports {
        match &report.outcome {
            RefreshOutcome::Written => println!("{}: updated", report.file),
            RefreshOutcome::Unchanged => println!("{}: unchanged", report.file),
            RefreshOutcome::Failed(reason) => println!("{}: FAILED ({reason})", report.file),
        }
    }
    Ok(())
}

fn run_prices(
    config: &AppConfig,
    input: Option<PathBuf>,
    start: Option<String>,
    end: Option<String>,
) -> Result<()> {
    let cfg = &config.prices;
    let input = input.unwrap_or_else(|| cfg.input_file.clone());
    let tickers = read_tickers(&input)?;
    let (start, end) = date_range_args(start, end)?;

    let retry = RetryPolicy::new(cfg.max_attempts, Duration::from_millis(cfg.base_delay_ms));
    let provider = YahooProvider::new(retry)?;

    match fetch_and_write(&provider, &tickers, &input, &cfg.output_dir, &start, &end, &StdoutProgress)? {
        Some(path) => println!("Price data saved to: {}", path.display()),
        None => println!("No price data returned for {start}..{end}; nothing written."),
    }
    Ok(())
}

fn run_sentiment(
    config: &AppConfig,
    input: Option<PathBuf>,
    start: Option<String>,
    end: Option<String>,
) -> Result<()> {
    let cfg = &config.sentiment;
    let api_key = read_api_key(&cfg.api_key_file)?;
    let input = input.unwrap_or_else(|| cfg.input_file.clone());
    let tickers = read_tickers(&input)?;
    let (start, end) = date_range_args(start, end)?;
    let range = DateRange::parse(&start, &end)?;

    let provider = AlphaVantageProvider::new(api_key, cfg.limit, Duration::from_secs(cfg.timeout_secs))?
        .with_base_url(cfg.base_url.clone());
    let started = chrono::Local::now().naive_local();
    let out = output_path(&cfg.output_dir, &cfg.output_prefix, started);

    let summary = run_sentiment_loop(
        &provider,
        &tickers,
        range,
        &out,
        Duration::from_secs(cfg.delay_secs),
        &StdoutProgress,
    );

    if let Some(msg) = &summary.halted_on_quota {
        println!("Stopped early, API limit reached: {msg}");
    }
    for (symbol, err) in &summary.failed {
        eprintln!("Error for {symbol}: {err}");
    }
    if summary.rows_written > 0 {
        println!(
            "Sentiment data for {}/{} tickers saved to: {}",
            summary.processed,
            summary.total,
            out.display()
        );
    } else {
        println!("No sentiment rows written.");
    }
    Ok(())
}

fn run_chat(config: &AppConfig) -> Result<()> {
    let cfg = &config.chat;
    let api_key = read_api_key(&cfg.api_key_file)?;
    let model = GeminiChat::new(api_key, cfg.model.clone(), Duration::from_secs(cfg.timeout_secs))?
        .with_base_url(cfg.base_url.clone());

    let context = ContextSources {
        sentiment_file: cfg.sentiment_file.clone(),
        price_file: cfg.price_file.clone(),
    };
    let transcript = Transcript::new(&cfg.transcript_dir, chrono::Local::now().naive_local());
    let retry = RetryPolicy::new(cfg.max_attempts, Duration::from_millis(cfg.base_delay_ms));
    let mut session = ChatSession::new(model, context, transcript, retry);

    let stdin = io::stdin();
    run_repl(&mut session, stdin.lock(), io::stdout().lock())?;
    Ok(())
}
