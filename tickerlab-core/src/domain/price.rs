use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily close for one ticker, as written to the price CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Company Name")]
    pub company: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Close")]
    pub close: f64,
}

/// Sort by ticker, then date. Stable, so same-day duplicates keep provider order.
pub fn sort_observations(rows: &mut [PriceObservation]) {
    rows.sort_by(|a, b| a.ticker.cmp(&b.ticker).then(a.date.cmp(&b.date)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(ticker: &str, day: u32) -> PriceObservation {
        PriceObservation {
            ticker: ticker.into(),
            company: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            close: 1.0,
        }
    }

    #[test]
    fn sorts_by_ticker_then_date() {
        let mut rows = vec![obs("MSFT", 3), obs("AAPL", 3), obs("MSFT", 2), obs("AAPL", 2)];
        sort_observations(&mut rows);
        let keys: Vec<(String, u32)> = rows
            .iter()
            .map(|r| (r.ticker.clone(), chrono::Datelike::day(&r.date)))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("AAPL".into(), 2),
                ("AAPL".into(), 3),
                ("MSFT".into(), 2),
                ("MSFT".into(), 3)
            ]
        );
    }
}
