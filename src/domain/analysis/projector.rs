use super::entities::{ChartDataset, MacdPoint, PricePoint, RawBar, RawSeries, RsiPoint};
use super::{Interval, labels};
use serde_json::Value;
use std::collections::HashMap;

/// Most recent entries kept per projection run.
pub const MAX_POINTS: usize = 50;

const RSI_DEFAULT: f64 = 50.0;

/// Invisible disambiguation marker appended to repeated axis labels, so a
/// chart indexed by label text never collapses two distinct points.
const LABEL_MARKER: char = '\u{200B}';

/// Pure transform from a raw date-keyed series into render-ready,
/// index-aligned price/RSI/MACD arrays.
pub struct ChartDataProjector;

impl ChartDataProjector {
    pub fn new() -> Self {
        Self
    }

    pub fn project(&self, series: &RawSeries, interval: Interval) -> ChartDataset {
        if series.is_empty() {
            return ChartDataset::default();
        }

        // Most recent window, reversed back into chronological order.
        let mut recent: Vec<(&String, &RawBar)> = series.iter().rev().take(MAX_POINTS).collect();
        recent.reverse();

        let mut dataset = ChartDataset::default();
        let mut label_counts: HashMap<String, usize> = HashMap::new();

        for (date, bar) in recent {
            let base_label = labels::axis_label(date, interval);
            let seen = label_counts.entry(base_label.clone()).or_insert(0);
            let display_date = if *seen == 0 {
                base_label.clone()
            } else {
                let mut disambiguated = base_label.clone();
                disambiguated.extend(std::iter::repeat(LABEL_MARKER).take(*seen));
                disambiguated
            };
            *seen += 1;

            dataset.price.push(PricePoint {
                date: date.clone(),
                display_date: display_date.clone(),
                full_date: labels::full_label(date, interval),
                open: coerce_num(&bar.open),
                high: coerce_num(&bar.high),
                low: coerce_num(&bar.low),
                close: coerce_num(&bar.close),
                volume: coerce_num(&bar.volume),
                sma50: bar.sma50.as_ref().map(coerce_num),
                sma200: bar.sma200.as_ref().map(coerce_num),
                bb_upper: bar.bollinger.as_ref().map(|b| coerce_num(&b.upper)),
                bb_middle: bar.bollinger.as_ref().map(|b| coerce_num(&b.middle)),
                bb_lower: bar.bollinger.as_ref().map(|b| coerce_num(&b.lower)),
            });

            dataset.rsi.push(RsiPoint {
                display_date: display_date.clone(),
                value: bar
                    .rsi
                    .as_ref()
                    .map(coerce_num)
                    .unwrap_or(RSI_DEFAULT)
                    .clamp(0.0, 100.0),
            });

            dataset.macd.push(match &bar.macd {
                Some(raw) => MacdPoint {
                    display_date,
                    macd: coerce_num(&raw.macd),
                    signal: coerce_num(&raw.signal),
                    histogram: coerce_num(&raw.histogram),
                },
                None => MacdPoint {
                    display_date,
                    macd: 0.0,
                    signal: 0.0,
                    histogram: 0.0,
                },
            });
        }

        dataset
    }
}

impl Default for ChartDataProjector {
    fn default() -> Self {
        Self::new()
    }
}

/// Numeric coercion over the service's mixed number/string quoting.
/// Unparseable or missing values become 0.
fn coerce_num(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
