use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TickerSnapshot {
    #[schema(example = "Apple Inc.")]
    pub company_name: String,
    #[schema(example = "AAPL")]
    pub company_ticker: String,
    pub current_price: f64,
    pub yesterday_close: f64,
    /// Percentage change from yesterday's close.
    pub today_growth: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TickerPrice {
    pub current_price: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TickerExists {
    pub exists: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TickerStats {
    pub daily_high: f64,
    pub daily_low: f64,
    pub market_cap: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TickerInfo {
    pub company_name: String,
    pub company_summary: String,
    pub sector: String,
    pub number_of_employees: u64,
    pub website_url: String,
    pub country: String,
}

/// A single close of the full price history.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct HistoryPoint {
    #[serde(rename = "Date")]
    #[schema(example = "2024-12-20")]
    pub date: String,
    #[serde(rename = "Close")]
    pub close: f64,
}

/// Closing prices for one period, keyed by `YYYY-MM-DD`.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(transparent)]
pub struct HistorySlice(pub BTreeMap<String, f64>);

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Bounds the history to a period instead of the full range.
    #[param(example = "1y")]
    pub length: Option<String>,
}
