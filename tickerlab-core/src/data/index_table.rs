//! Index constituent tables scraped from HTML pages.
//!
//! A page is parsed into a [`Table`] of strings, normalized (footnotes stripped,
//! columns renamed to `Symbol`/`Security`), and compared cell by cell against the
//! CSV already on disk so unchanged tables are never rewritten.

use super::provider::{DataError, Page, PageFetcher, RequestHeaders};
use crate::footnote::strip_footnotes;
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use std::time::Duration;

/// Column renames applied after scraping: source name, canonical name.
pub const COLUMN_RENAMES: [(&str, &str); 2] = [("Company", "Security"), ("Ticker", "Symbol")];

/// A rectangular table of text cells with a header row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Strip footnote markers everywhere and apply [`COLUMN_RENAMES`].
    pub fn normalize(mut self) -> Self {
        for h in &mut self.headers {
            let stripped = strip_footnotes(h).trim().to_string();
            *h = COLUMN_RENAMES
                .iter()
                .find(|(from, _)| *from == stripped)
                .map(|(_, to)| to.to_string())
                .unwrap_or(stripped);
        }
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                *cell = strip_footnotes(cell).trim().to_string();
            }
        }
        self
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Read a CSV file written by [`Table::write_csv`] (or any headed CSV).
    pub fn read_csv(path: &Path) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;
        let headers = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), DataError> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Whether a refresh touched the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Write `table` to `path` unless the file already holds the same table.
///
/// A file that cannot be parsed as CSV counts as different and is overwritten.
pub fn write_if_changed(path: &Path, table: &Table) -> Result<WriteOutcome, DataError> {
    if path.is_file() {
        match Table::read_csv(path) {
            Ok(existing) if existing == *table => return Ok(WriteOutcome::Unchanged),
            Ok(_) => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "existing index file unreadable, replacing"),
        }
    }
    table.write_csv(path)?;
    Ok(WriteOutcome::Written)
}

fn selector(css: &str) -> Result<Selector, DataError> {
    Selector::parse(css).map_err(|e| DataError::Other(format!("bad selector {css}: {e}")))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `tr` rows belonging to `table` itself: direct children, or children of its
/// own `thead`/`tbody`/`tfoot`. Rows of nested tables are not included.
fn own_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|r| r.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

/// `colspan`/`rowspan` value, at least 1. Absurd values are capped.
fn span(cell: ElementRef<'_>, attr: &str) -> usize {
    cell.value()
        .attr(attr)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}

const MAX_SPAN: usize = 1000;

/// Lay rows out on a grid, copying spanned cell text into every slot it covers.
/// Rows without any `th`/`td` cell are dropped.
fn expand_spans(rows: Vec<ElementRef<'_>>) -> Vec<Vec<String>> {
    // Per column: rows still covered by a rowspan above, and its text.
    let mut pending: Vec<Option<(usize, String)>> = Vec::new();
    let mut grid = Vec::new();

    for tr in rows {
        let mut cells = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|c| matches!(c.value().name(), "th" | "td"))
            .peekable();
        if cells.peek().is_none() {
            continue;
        }

        let mut row: Vec<String> = Vec::new();
        loop {
            let col = row.len();
            if let Some((left, text)) = pending.get_mut(col).and_then(Option::take) {
                if left > 1 {
                    pending[col] = Some((left - 1, text.clone()));
                }
                row.push(text);
                continue;
            }
            match cells.next() {
                Some(cell) => {
                    let text = cell_text(cell);
                    let rowspan = span(cell, "rowspan");
                    for _ in 0..span(cell, "colspan") {
                        let c = row.len();
                        if rowspan > 1 {
                            if pending.len() <= c {
                                pending.resize(c + 1, None);
                            }
                            pending[c] = Some((rowspan - 1, text.clone()));
                        }
                        row.push(text.clone());
                    }
                }
                // Out of cells, but a rowspan further right still covers this row.
                None if pending.iter().skip(col).any(Option::is_some) => row.push(String::new()),
                None => break,
            }
        }
        grid.push(row);
    }
    grid
}

/// Parse the `index`-th (zero based) `<table>` in `html`.
///
/// The first row supplies the headers. `colspan`/`rowspan` cells are expanded
/// into every slot they cover, and data rows are padded or truncated to the
/// header width. Only the table's own rows count, so a table nested in a cell
/// doesn't add rows to its parent.
pub fn parse_html_table(html: &str, index: usize) -> Result<Table, DataError> {
    let doc = Html::parse_document(html);
    let table_sel = selector("table")?;

    let tables: Vec<ElementRef<'_>> = doc.select(&table_sel).collect();
    let table = *tables.get(index).ok_or(DataError::TableNotFound {
        index,
        found: tables.len(),
    })?;

    let mut rows = expand_spans(own_rows(table)).into_iter();
    let headers = rows
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged(format!("table {index} has no rows")))?;
    let width = headers.len();
    let rows = rows
        .map(|mut r| {
            r.resize(width, String::new());
            r
        })
        .collect();

    Ok(Table { headers, rows })
}

/// Blocking HTTP page fetcher with a short timeout.
pub struct HttpPageFetcher {
    client: reqwest::blocking::Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpPageFetcher {
    fn get(&self, url: &str, headers: &RequestHeaders) -> Result<Page, DataError> {
        let mut req = self.client.get(url);
        for (name, value) in headers {
            req = req.header(name.as_str(), value.as_str());
        }
        let resp = req.send()?;
        let status = resp.status().as_u16();
        // Pages are served as UTF-8 regardless of what the headers claim.
        let bytes = resp.bytes()?;
        Ok(Page {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}
