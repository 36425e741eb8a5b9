use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::models::{InfoRecord, PriceRow, UpstreamError};

/// quoteSummary modules merged into one info record, first module wins on
/// duplicate keys.
pub const QUOTE_SUMMARY_MODULES: [&str; 5] = [
    "price",
    "summaryDetail",
    "financialData",
    "assetProfile",
    "defaultKeyStatistics",
];

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    description: String,
}

impl From<ApiError> for UpstreamError {
    fn from(error: ApiError) -> Self {
        if error.code.eq_ignore_ascii_case("Not Found") {
            UpstreamError::NotFound(error.description)
        } else {
            UpstreamError::Api {
                code: error.code,
                description: error.description,
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
    #[serde(default)]
    events: Events,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default, rename = "gmtoffset")]
    gmt_offset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct Events {
    #[serde(default)]
    dividends: HashMap<String, DividendEvent>,
    #[serde(default)]
    splits: HashMap<String, SplitEvent>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct SplitEvent {
    numerator: f64,
    denominator: f64,
    date: i64,
}

fn column(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

impl ChartResult {
    fn into_rows(self) -> Vec<PriceRow> {
        let offset = self.meta.gmt_offset;
        let trading_day =
            |ts: i64| DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive());

        let dividends: HashMap<NaiveDate, f64> = self
            .events
            .dividends
            .into_values()
            .filter_map(|event| Some((trading_day(event.date)?, event.amount)))
            .collect();
        let splits: HashMap<NaiveDate, f64> = self
            .events
            .splits
            .into_values()
            .filter(|event| event.denominator != 0.0)
            .filter_map(|event| {
                Some((
                    trading_day(event.date)?,
                    event.numerator / event.denominator,
                ))
            })
            .collect();

        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();

        // Rows without a close are placeholders for halted or in-progress days.
        self.timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let close = column(&quote.close, i)?;
                let date = trading_day(ts)?;
                Some(PriceRow {
                    date,
                    open: column(&quote.open, i).unwrap_or(f64::NAN),
                    high: column(&quote.high, i).unwrap_or(f64::NAN),
                    low: column(&quote.low, i).unwrap_or(f64::NAN),
                    close,
                    volume: column(&quote.volume, i).map_or(0, |v| v as u64),
                    dividends: dividends.get(&date).copied().unwrap_or(0.0),
                    stock_splits: splits.get(&date).copied().unwrap_or(0.0),
                })
            })
            .collect()
    }
}

/// Turns a `/v8/finance/chart` document into daily rows, oldest first.
pub fn parse_chart(body: &str) -> Result<Vec<PriceRow>, UpstreamError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;
    if let Some(error) = envelope.chart.error {
        return Err(error.into());
    }
    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| UpstreamError::Parse("chart response carries no result".to_string()))?;
    Ok(result.into_rows())
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    result: Option<Vec<Map<String, Value>>>,
    error: Option<ApiError>,
}

/// `{"raw": 1.5, "fmt": "1.50"}` becomes `1.5`; empty objects and nulls
/// are dropped.
fn flatten_value(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(fields) if fields.is_empty() => None,
        Value::Object(fields) => match fields.get("raw") {
            Some(raw) => Some(raw.clone()),
            None => Some(value.clone()),
        },
        other => Some(other.clone()),
    }
}

/// Flattens a `/v10/finance/quoteSummary` document into one info record.
pub fn parse_quote_summary(body: &str, ticker: &str) -> Result<InfoRecord, UpstreamError> {
    let envelope: QuoteSummaryEnvelope = serde_json::from_str(body)?;
    if let Some(error) = envelope.quote_summary.error {
        return Err(error.into());
    }
    let modules = envelope
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| UpstreamError::NotFound(ticker.to_string()))?;

    let mut record = InfoRecord::default();
    for name in QUOTE_SUMMARY_MODULES {
        let Some(Value::Object(fields)) = modules.get(name) else {
            continue;
        };
        for (key, value) in fields {
            if key == "maxAge" {
                continue;
            }
            if let Some(value) = flatten_value(value) {
                record.insert_if_absent(key, value);
            }
        }
    }

    if record.is_empty() {
        return Err(UpstreamError::NotFound(ticker.to_string()));
    }
    Ok(record)
}

/// The crumb endpoint answers with plain text, or an HTML page when the
/// session cookie was not accepted.
pub fn parse_crumb(body: &str) -> Result<String, UpstreamError> {
    let crumb = body.trim();
    if crumb.is_empty() || crumb.contains('<') || crumb.contains(' ') {
        return Err(UpstreamError::Unauthorized);
    }
    Ok(crumb.to_string())
}
