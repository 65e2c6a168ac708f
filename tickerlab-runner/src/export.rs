//! CSV persistence for price and sentiment records.
//!
//! Price files are written once per run. Sentiment files are append logs: the
//! header goes in only when the file is created, so a run interrupted midway
//! leaves a valid CSV that later appends continue.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tickerlab_core::domain::{PriceObservation, SentimentItem};

pub const PRICE_COLUMNS: [&str; 4] = ["Ticker", "Company Name", "Date", "Close"];
pub const SENTIMENT_COLUMNS: [&str; 7] = ["Ticker", "Security", "Title", "Time", "Score", "Label", "URL"];

/// Columns a sentiment file must carry to be read back.
const SENTIMENT_REQUIRED: [&str; 3] = ["Ticker", "Security", "Title"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("file '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("file '{}' is missing required columns: {}", .path.display(), .missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Write price rows with a header, replacing any existing file.
pub fn write_prices_csv(path: &Path, rows: &[PriceObservation]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Append sentiment rows, writing the header only if the file does not exist yet.
pub fn append_sentiment_rows(path: &Path, rows: &[SentimentItem]) -> Result<(), ExportError> {
    let header = !path.exists();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new().has_headers(header).from_writer(file);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read typed rows, skipping (and logging) rows that fail validation.
fn read_rows<T: DeserializeOwned>(path: &Path, required: &[&str]) -> Result<Vec<T>, ExportError> {
    if !path.is_file() {
        return Err(ExportError::NotFound(path.to_path_buf()));
    }
    let mut rdr = csv::Reader::from_path(path)?;
    let headers = rdr.headers()?.clone();
    let missing: Vec<String> = required
        .iter()
        .filter(|c| !headers.iter().any(|h| h == **c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ExportError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        });
    }

    let mut rows = Vec::new();
    for (i, result) in rdr.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => tracing::warn!(path = %path.display(), row = i + 2, error = %e, "skipping invalid row"),
        }
    }
    Ok(rows)
}

pub fn read_sentiment_csv(path: &Path) -> Result<Vec<SentimentItem>, ExportError> {
    read_rows(path, &SENTIMENT_REQUIRED)
}

pub fn read_prices_csv(path: &Path) -> Result<Vec<PriceObservation>, ExportError> {
    read_rows(path, &PRICE_COLUMNS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn item(ticker: &str, title: &str, time: &str) -> SentimentItem {
        SentimentItem {
            ticker: ticker.into(),
            security: format!("{ticker} Inc."),
            title: title.into(),
            time: Some(time.into()),
            score: Some(0.25),
            label: Some("Somewhat-Bullish".into()),
            url: Some("https://news/1".into()),
        }
    }

    #[test]
    fn append_writes_header_once() {
        let tmp = TempDir::new().unwrap();
        let p = tmp.path().join("sentiment-data.csv");
        append_sentiment_rows(&p, &[item("AAPL", "One", "20240102T100000")]).unwrap();
        append_sentiment_rows(&p, &[SentimentItem::no_data("MSFT", "Microsoft")]).unwrap();

        let content = std::fs::read_to_string(&p).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], SENTIMENT_COLUMNS.join(","));
        assert_eq!(lines[2], "MSFT,Microsoft,NO_DATA,,,,");

        let back = read_sentiment_csv(&p).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0], item("AAPL", "One", "20240102T100000"));
        assert!(back[1].is_no_data());
    }

    #[test]
    fn prices_round_trip_with_header() {
        let tmp = TempDir::new().unwrap();
        let p = tmp.path().join("out/DJIA_2024-01-02_2024-01-03.csv");
        let rows = vec![PriceObservation {
            ticker: "AAPL".into(),
            company: "Apple Inc.".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            close: 185.64,
        }];
        write_prices_csv(&p, &rows).unwrap();
        let content = std::fs::read_to_string(&p).unwrap();
        assert!(content.starts_with("Ticker,Company Name,Date,Close\nAAPL,Apple Inc.,2024-01-02,185.64"));
        assert_eq!(read_prices_csv(&p).unwrap(), rows);
    }

    #[test]
    fn invalid_rows_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let p = tmp.path().join("prices.csv");
        std::fs::write(
            &p,
            "Ticker,Company Name,Date,Close\nAAPL,Apple,2024-01-02,1.5\nMSFT,Microsoft,not-a-date,2.0\n",
        )
        .unwrap();
        assert_eq!(read_prices_csv(&p).unwrap().len(), 1);
    }

    #[test]
    fn missing_columns_rejected() {
        let tmp = TempDir::new().unwrap();
        let p = tmp.path().join("s.csv");
        std::fs::write(&p, "Ticker,Headline\nAAPL,x\n").unwrap();
        match read_sentiment_csv(&p) {
            Err(ExportError::MissingColumns { missing, .. }) => assert_eq!(missing, vec!["Security", "Title"]),
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }
}
