use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One raw bar as delivered by the remote analysis service. Field values are
/// kept as opaque JSON because the service mixes numeric and stringly-typed
/// quotes; the projector coerces them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    #[serde(default)]
    pub open: Value,
    #[serde(default)]
    pub high: Value,
    #[serde(default)]
    pub low: Value,
    #[serde(default)]
    pub close: Value,
    #[serde(default)]
    pub volume: Value,
    #[serde(default)]
    pub sma50: Option<Value>,
    #[serde(default)]
    pub sma200: Option<Value>,
    #[serde(default)]
    pub bollinger: Option<RawBands>,
    #[serde(default)]
    pub rsi: Option<Value>,
    #[serde(default)]
    pub macd: Option<RawMacd>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBands {
    #[serde(default)]
    pub upper: Value,
    #[serde(default)]
    pub middle: Value,
    #[serde(default)]
    pub lower: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMacd {
    #[serde(default)]
    pub macd: Value,
    #[serde(default)]
    pub signal: Value,
    #[serde(default)]
    pub histogram: Value,
}

/// Date-ordered raw series keyed by ISO `YYYY-MM-DD` date. BTreeMap keeps
/// chronological order because ISO dates sort lexicographically.
pub type RawSeries = BTreeMap<String, RawBar>;

/// Pull the structured series section out of an otherwise opaque analysis
/// payload. Everything else in the payload passes through untouched; a
/// missing or malformed series projects to an empty dataset.
pub fn extract_series(result: &Value) -> RawSeries {
    result
        .get("series")
        .cloned()
        .and_then(|series| serde_json::from_value(series).ok())
        .unwrap_or_default()
}

/// Render-ready price point, index-aligned with the RSI and MACD arrays
/// through the shared disambiguated `display_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub display_date: String,
    pub full_date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiPoint {
    pub display_date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub display_date: String,
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Output of one projection run: three equal-length, index-aligned arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub price: Vec<PricePoint>,
    pub rsi: Vec<RsiPoint>,
    pub macd: Vec<MacdPoint>,
}

impl ChartDataset {
    pub fn is_empty(&self) -> bool {
        self.price.is_empty()
    }

    pub fn len(&self) -> usize {
        self.price.len()
    }
}
