//! Index source definitions and the small files that configure them.

use super::provider::{DataError, RequestHeaders};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One index page: where to fetch it, which table to take, where to store it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSource {
    pub file: String,
    pub url: String,
    pub table_index: usize,
}

/// Known index files and the zero-based table holding their constituents, in
/// the order URLs appear in the link file.
pub const KNOWN_INDEXES: [(&str, usize); 5] = [
    ("sp-400.csv", 0),
    ("sp-500.csv", 1),
    ("sp-600.csv", 0),
    ("Dow-Jones-Industrial-Average.csv", 2),
    ("Nasdaq-100.csv", 4),
];

/// Parse link file contents: entries separated by commas and/or newlines,
/// whitespace and surrounding double quotes removed, blanks dropped.
pub fn parse_links(content: &str) -> Vec<String> {
    content
        .lines()
        .flat_map(|line| line.split(','))
        .map(|part| part.trim().trim_matches('"').trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

pub fn read_link_file(path: &Path) -> Result<Vec<String>, DataError> {
    Ok(parse_links(&std::fs::read_to_string(path)?))
}

/// Pair links with [`KNOWN_INDEXES`] in order. Surplus links are ignored;
/// missing links leave the trailing indexes out.
pub fn known_sources(links: &[String]) -> Vec<IndexSource> {
    if links.len() != KNOWN_INDEXES.len() {
        tracing::warn!(
            links = links.len(),
            expected = KNOWN_INDEXES.len(),
            "link count does not match known index count"
        );
    }
    KNOWN_INDEXES
        .iter()
        .zip(links)
        .map(|(&(file, table_index), url)| IndexSource {
            file: file.to_string(),
            url: url.clone(),
            table_index,
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct HeaderSet {
    headers: serde_json::Map<String, serde_json::Value>,
}

/// Extract request headers from a captured header set.
///
/// Only headers whose name contains `user` (case-insensitive), in practice
/// `User-Agent`, are kept; the rest of a browser capture is noise or session
/// specific.
pub fn parse_request_headers(json: &str) -> Result<RequestHeaders, DataError> {
    let set: HeaderSet = serde_json::from_str(json)
        .map_err(|e| DataError::Other(format!("header file: {e}")))?;
    Ok(set
        .headers
        .into_iter()
        .filter(|(name, _)| name.to_lowercase().contains("user"))
        .map(|(name, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (name, value)
        })
        .collect())
}

pub fn load_request_headers(path: &Path) -> Result<RequestHeaders, DataError> {
    parse_request_headers(&std::fs::read_to_string(path)?)
}
