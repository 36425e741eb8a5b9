use std::{future::Future, str::FromStr, sync::Arc, time::Duration};

use crate::{
    external::MarketData,
    models::{
        dto::{
            HistoryPoint, HistorySlice, TickerExists, TickerInfo, TickerPrice, TickerSnapshot,
            TickerStats,
        },
        GatewayError, InfoRecord, Period, PriceRow, UpstreamError,
    },
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Issues one bounded provider lookup per call and reshapes the answer into
/// the response DTOs.
pub struct TickerGateway {
    market: Arc<dyn MarketData>,
    timeout: Duration,
}

pub fn parse_period(raw: &str) -> Result<Period, GatewayError> {
    Period::from_str(raw).map_err(|_| GatewayError::InvalidPeriod(raw.to_string()))
}

/// Percentage change from `previous` to `current`.
pub fn growth_percent(current: f64, previous: f64) -> f64 {
    ((current / previous) - 1.0) * 100.0
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Date/Close pairs, one per row, in the order the rows were given.
pub fn history_points(rows: Vec<PriceRow>) -> impl Iterator<Item = HistoryPoint> {
    rows.into_iter().map(|row| HistoryPoint {
        date: row.date.format(DATE_FORMAT).to_string(),
        close: round_cents(row.close),
    })
}

impl TickerGateway {
    pub fn new(market: Arc<dyn MarketData>, timeout: Duration) -> Self {
        TickerGateway { market, timeout }
    }

    async fn bounded<T>(
        &self,
        lookup: impl Future<Output = Result<T, UpstreamError>>,
    ) -> Result<T, GatewayError> {
        tokio::time::timeout(self.timeout, lookup)
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))?
            .map_err(GatewayError::from)
    }

    async fn info_record(&self, ticker: &str) -> Result<InfoRecord, GatewayError> {
        self.bounded(self.market.info(ticker)).await
    }

    async fn price_rows(&self, ticker: &str, period: Period) -> Result<Vec<PriceRow>, GatewayError> {
        self.bounded(self.market.history(ticker, period)).await
    }

    pub async fn snapshot(&self, ticker: &str) -> Result<TickerSnapshot, GatewayError> {
        let info = self.info_record(ticker).await?;
        let current_price = info.require_f64("currentPrice")?;
        let yesterday_close = info.require_f64("previousClose")?;
        if yesterday_close == 0.0 {
            return Err(GatewayError::SchemaMismatch {
                field: "previousClose",
                expected: "non-zero number",
            });
        }

        Ok(TickerSnapshot {
            company_name: info.require_str("shortName")?.to_string(),
            company_ticker: info.require_str("symbol")?.to_string(),
            current_price,
            yesterday_close,
            today_growth: growth_percent(current_price, yesterday_close),
        })
    }

    /// An upstream failure is an error, never `exists: false`.
    pub async fn exists(&self, ticker: &str) -> Result<TickerExists, GatewayError> {
        let rows = self.price_rows(ticker, Period::OneDay).await?;
        Ok(TickerExists {
            exists: !rows.is_empty(),
        })
    }

    pub async fn price(&self, ticker: &str) -> Result<TickerPrice, GatewayError> {
        let info = self.info_record(ticker).await?;
        Ok(TickerPrice {
            current_price: info.require_f64("currentPrice")?,
        })
    }

    /// Closing prices over `period`. The period is checked before the
    /// provider is contacted.
    pub async fn history_slice(&self, ticker: &str, period: &str) -> Result<HistorySlice, GatewayError> {
        let period = parse_period(period)?;
        let rows = self.price_rows(ticker, period).await?;
        Ok(HistorySlice(
            rows.into_iter()
                .map(|row| (row.date.format(DATE_FORMAT).to_string(), row.close))
                .collect(),
        ))
    }

    /// Date/Close history over the full available range, or over `length`
    /// when given.
    pub async fn full_history(
        &self,
        ticker: &str,
        length: Option<&str>,
    ) -> Result<Vec<HistoryPoint>, GatewayError> {
        let period = length.map(parse_period).transpose()?.unwrap_or(Period::Max);
        let rows = self.price_rows(ticker, period).await?;
        Ok(history_points(rows).collect())
    }

    pub async fn stats(&self, ticker: &str) -> Result<TickerStats, GatewayError> {
        let info = self.info_record(ticker).await?;
        Ok(TickerStats {
            daily_high: info.require_f64("dayHigh")?,
            daily_low: info.require_f64("dayLow")?,
            market_cap: info.require_f64("marketCap")?,
        })
    }

    pub async fn info(&self, ticker: &str) -> Result<TickerInfo, GatewayError> {
        let info = self.info_record(ticker).await?;
        Ok(TickerInfo {
            company_name: info.require_str("shortName")?.to_string(),
            company_summary: info.require_str("longBusinessSummary")?.to_string(),
            sector: info.require_str("sector")?.to_string(),
            number_of_employees: info.require_u64("fullTimeEmployees")?,
            website_url: info.require_str("website")?.to_string(),
            country: info.require_str("country")?.to_string(),
        })
    }
}
