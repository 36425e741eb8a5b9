use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of the provider's historical price table.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub dividends: f64,
    pub stock_splits: f64,
}
