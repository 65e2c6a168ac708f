//! Domain records shared by every job.

pub mod price;
pub mod sentiment;
pub mod ticker;

pub use price::{sort_observations, PriceObservation};
pub use sentiment::{SentimentItem, NO_DATA_TITLE};
pub use ticker::{normalize_symbol, TickerRecord};
