use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use super::MarketData;
use crate::models::{InfoRecord, Period, PriceRow, UpstreamError};

/// In-memory provider that records every call it receives.
#[derive(Default)]
pub struct MockMarket {
    info: Option<InfoRecord>,
    history: Option<Vec<PriceRow>>,
    delay: Option<Duration>,
    info_calls: AtomicUsize,
    history_calls: Mutex<Vec<Period>>,
}

impl MockMarket {
    /// Every lookup fails as if the ticker did not exist.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn with_info(info: Value) -> Self {
        Self {
            info: Some(serde_json::from_value(info).expect("info fixture must be an object")),
            ..Self::default()
        }
    }

    pub fn with_history(rows: Vec<PriceRow>) -> Self {
        Self {
            history: Some(rows),
            ..Self::default()
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> Vec<Period> {
        self.history_calls.lock().unwrap().clone()
    }

    async fn wait(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl MarketData for MockMarket {
    async fn info(&self, ticker: &str) -> Result<InfoRecord, UpstreamError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        self.info
            .clone()
            .ok_or_else(|| UpstreamError::NotFound(ticker.to_string()))
    }

    async fn history(&self, ticker: &str, period: Period) -> Result<Vec<PriceRow>, UpstreamError> {
        self.history_calls.lock().unwrap().push(period);
        self.wait().await;
        self.history
            .clone()
            .ok_or_else(|| UpstreamError::NotFound(ticker.to_string()))
    }
}

/// A full price row for `date` (`YYYY-MM-DD`) closing at `close`.
pub fn row(date: &str, close: f64) -> PriceRow {
    PriceRow {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("fixture date"),
        open: close - 1.0,
        high: close + 2.0,
        low: close - 2.0,
        close,
        volume: 1_000_000,
        dividends: 0.0,
        stock_splits: 0.0,
    }
}

pub fn apple_info() -> Value {
    serde_json::json!({
        "shortName": "Apple Inc.",
        "symbol": "AAPL",
        "currentPrice": 150.0,
        "previousClose": 100.0,
        "dayHigh": 152.5,
        "dayLow": 147.25,
        "marketCap": 2_300_000_000_000_u64,
        "longBusinessSummary": "Apple Inc. designs, manufactures, and markets smartphones.",
        "sector": "Technology",
        "fullTimeEmployees": 161000,
        "website": "https://www.apple.com",
        "country": "United States"
    })
}
