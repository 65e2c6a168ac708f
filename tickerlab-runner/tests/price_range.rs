//! Integration tests for the price range fetch using an in-memory provider.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use tickerlab_core::data::{DailyClose, DataError, PriceProvider, SilentProgress};
use tickerlab_core::dates::DateRange;
use tickerlab_core::domain::TickerRecord;
use tickerlab_runner::prices::{fetch_and_write, fetch_prices_by_range};

/// Serves fixed closes per symbol, filtered to the requested range, and
/// records every call.
struct FakeProvider {
    closes: HashMap<String, Result<Vec<(u32, f64)>, String>>,
    calls: RefCell<Vec<String>>,
}

impl FakeProvider {
    fn new() -> Self {
        Self {
            closes: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn with(mut self, symbol: &str, days: &[(u32, f64)]) -> Self {
        self.closes.insert(symbol.to_string(), Ok(days.to_vec()));
        self
    }

    fn failing(mut self, symbol: &str) -> Self {
        self.closes.insert(symbol.to_string(), Err("connection reset".into()));
        self
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl PriceProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn fetch_closes(&self, symbol: &str, range: DateRange) -> Result<Vec<DailyClose>, DataError> {
        self.calls.borrow_mut().push(symbol.to_string());
        match self.closes.get(symbol) {
            None => Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            }),
            Some(Err(msg)) => Err(DataError::NetworkUnreachable(msg.clone())),
            Some(Ok(days)) => Ok(days
                .iter()
                .map(|&(day, close)| DailyClose {
                    date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                    close,
                })
                .filter(|c| c.date >= range.start && c.date <= range.end)
                .collect()),
        }
    }
}

fn dow_pair() -> Vec<TickerRecord> {
    vec![
        TickerRecord::new("MSFT", "Microsoft Corp."),
        TickerRecord::new("AAPL", "Apple Inc."),
    ]
}

#[test]
fn two_tickers_two_days_sorted() {
    // Provider answers in reverse date order to prove the output is sorted.
    let provider = FakeProvider::new()
        .with("AAPL", &[(3, 184.25), (2, 185.64)])
        .with("MSFT", &[(3, 370.60), (2, 370.87)]);

    let rows = fetch_prices_by_range(&provider, &dow_pair(), "2024-01-02", "2024-01-03", &SilentProgress);

    let keys: Vec<(&str, u32)> = rows.iter().map(|r| (r.ticker.as_str(), r.date.day())).collect();
    assert_eq!(keys, vec![("AAPL", 2), ("AAPL", 3), ("MSFT", 2), ("MSFT", 3)]);
    assert_eq!(rows[0].company, "Apple Inc.");
    assert!((rows[0].close - 185.64).abs() < 1e-9);
}

#[test]
fn failing_ticker_contributes_nothing() {
    let provider = FakeProvider::new()
        .with("AAPL", &[(2, 185.64)])
        .failing("MSFT");

    let rows = fetch_prices_by_range(&provider, &dow_pair(), "2024-01-02", "2024-01-03", &SilentProgress);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].ticker, "AAPL");
    assert_eq!(provider.call_count(), 2, "each ticker is tried once, no retry");
}

#[test]
fn absent_days_are_not_filled() {
    let provider = FakeProvider::new().with("AAPL", &[(2, 1.0), (5, 2.0)]);
    let tickers = vec![TickerRecord::new("AAPL", "Apple Inc.")];
    let rows = fetch_prices_by_range(&provider, &tickers, "2024-01-02", "2024-01-05", &SilentProgress);
    assert_eq!(rows.len(), 2);
}

#[test]
fn invalid_dates_make_no_calls() {
    let provider = FakeProvider::new().with("AAPL", &[(2, 1.0)]);
    for (start, end) in [
        ("2024/01/02", "2024-01-03"),
        ("2024-01-02", "Jan 3"),
        ("2024-1-2", "2024-01-03"),
        ("2024-01-05", "2024-01-02"),
    ] {
        let rows = fetch_prices_by_range(&provider, &dow_pair(), start, end, &SilentProgress);
        assert!(rows.is_empty(), "{start}..{end} produced rows");
    }
    assert_eq!(provider.call_count(), 0);
}

#[test]
fn writes_dated_file_only_when_rows_exist() {
    let tmp = tempfile::TempDir::new().unwrap();
    let input = std::path::Path::new("Dow-Jones-Industrial-Average.csv");

    let empty = FakeProvider::new();
    let none = fetch_and_write(&empty, &dow_pair(), input, tmp.path(), "2024-01-02", "2024-01-03", &SilentProgress)
        .unwrap();
    assert!(none.is_none());

    let provider = FakeProvider::new().with("AAPL", &[(2, 185.64)]);
    let path = fetch_and_write(&provider, &dow_pair(), input, tmp.path(), "2024-01-02", "2024-01-03", &SilentProgress)
        .unwrap()
        .unwrap();
    assert_eq!(path, tmp.path().join("DJIA_2024-01-02_2024-01-03.csv"));
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "Ticker,Company Name,Date,Close\nAAPL,Apple Inc.,2024-01-02,185.64\n"
    );
}

proptest! {
    #[test]
    fn any_non_date_start_is_rejected_without_calls(start in "[^0-9]{0,12}|[0-9]{1,9}") {
        let provider = FakeProvider::new().with("AAPL", &[(2, 1.0)]);
        let rows = fetch_prices_by_range(&provider, &dow_pair(), &start, "2024-01-03", &SilentProgress);
        prop_assert!(rows.is_empty());
        prop_assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn valid_dates_are_accepted(day in 1u32..=28, month in 1u32..=12) {
        let d = NaiveDate::from_ymd_opt(2024, month, day).unwrap();
        let s = d.format("%Y-%m-%d").to_string();
        let provider = FakeProvider::new();
        let tickers = vec![TickerRecord::new("AAPL", "Apple Inc.")];
        let _ = fetch_prices_by_range(&provider, &tickers, &s, &s, &SilentProgress);
        prop_assert_eq!(provider.call_count(), 1);
    }
}
