use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Lookback window accepted by the history endpoints.
/// Parsing is case sensitive: `"max"` is valid, `"MAX"` is not.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
    ToSchema,
)]
pub enum Period {
    #[strum(serialize = "1d")]
    #[serde(rename = "1d")]
    OneDay,
    #[strum(serialize = "5d")]
    #[serde(rename = "5d")]
    FiveDays,
    #[strum(serialize = "1mo")]
    #[serde(rename = "1mo")]
    OneMonth,
    #[strum(serialize = "3mo")]
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[strum(serialize = "6mo")]
    #[serde(rename = "6mo")]
    SixMonths,
    #[strum(serialize = "1y")]
    #[serde(rename = "1y")]
    OneYear,
    #[strum(serialize = "2y")]
    #[serde(rename = "2y")]
    TwoYears,
    #[strum(serialize = "5y")]
    #[serde(rename = "5y")]
    FiveYears,
    #[strum(serialize = "10y")]
    #[serde(rename = "10y")]
    TenYears,
    #[strum(serialize = "ytd")]
    #[serde(rename = "ytd")]
    YearToDate,
    #[strum(serialize = "max")]
    #[serde(rename = "max")]
    Max,
}
