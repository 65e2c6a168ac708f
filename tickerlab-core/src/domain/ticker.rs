use serde::{Deserialize, Serialize};

/// An index constituent: exchange symbol plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerRecord {
    pub symbol: String,
    pub security: String,
}

impl TickerRecord {
    /// Build a record, normalizing the symbol to vendor conventions.
    pub fn new(symbol: &str, security: &str) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            security: security.trim().to_string(),
        }
    }
}

/// Upper-case, trim, and replace `.` with `-` (`brk.b` becomes `BRK-B`).
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase().replace('.', "-")
}
