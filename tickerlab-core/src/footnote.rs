//! Wikipedia-style footnote markers (`[1]`, `[23]`) in scraped table text.

use regex::Regex;
use std::sync::OnceLock;

fn marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\d+\]").expect("static footnote regex"))
}

/// Remove every bracketed integer from `s` (`"Apple[1]"` becomes `"Apple"`).
pub fn strip_footnotes(s: &str) -> String {
    marker().replace_all(s, "").into_owned()
}
