//! Parsing of Yahoo Finance quote-summary and chart payloads.

use analysis_core::{AnalysisError, Bar, MetricsInput};
use chrono::DateTime;
use serde_json::{Map, Value};

/// Quote-summary modules requested for a metrics snapshot.
pub const QUOTE_SUMMARY_MODULES: &str = "price,summaryDetail,defaultKeyStatistics,financialData,assetProfile";

/// Module precedence when the same key appears in more than one module.
const MODULE_PRIORITY: [&str; 5] = ["financialData", "price", "defaultKeyStatistics", "summaryDetail", "assetProfile"];

/// Keys carried through as text rather than numbers.
const LABEL_KEYS: [&str; 4] = ["shortName", "longName", "sector", "industry"];

/// Yahoo wraps most numbers as `{"raw": 1.23, "fmt": "1.23"}`; empty objects mean
/// "no value". Returns the bare number either way.
fn unwrap_raw(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Object(obj) => obj.get("raw").and_then(|v| v.as_f64()),
        _ => None,
    }
}

/// Merge the quote-summary modules into one flat camelCase map. A key already
/// taken by a module earlier in [`MODULE_PRIORITY`] is kept.
fn flatten_modules(result: &Value) -> Map<String, Value> {
    let mut flat = Map::new();

    for name in MODULE_PRIORITY {
        let Some(fields) = result.get(name).and_then(|m| m.as_object()) else { continue };
        for (key, value) in fields {
            if flat.contains_key(key) {
                continue;
            }
            if LABEL_KEYS.contains(&key.as_str()) {
                if let Some(s) = value.as_str() {
                    flat.insert(key.clone(), Value::String(s.to_string()));
                }
            } else if let Some(n) = unwrap_raw(value) {
                if let Some(num) = serde_json::Number::from_f64(n) {
                    flat.insert(key.clone(), Value::Number(num));
                }
            }
        }
    }
    flat
}

/// Build a [`MetricsInput`] from a quote-summary response body.
///
/// Fails with `DataUnavailable` when the result set is empty or no current price
/// can be found.
pub fn parse_quote_summary(symbol: &str, body: &Value) -> Result<MetricsInput, AnalysisError> {
    let summary = body
        .get("quoteSummary")
        .ok_or_else(|| AnalysisError::InvalidData("missing quoteSummary".to_string()))?;

    if let Some(desc) = summary
        .get("error")
        .and_then(|e| e.get("description"))
        .and_then(|d| d.as_str())
    {
        return Err(AnalysisError::DataUnavailable(format!("{}: {}", symbol, desc)));
    }

    let result = summary
        .get("result")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| AnalysisError::DataUnavailable(format!("No data found for {}", symbol)))?;

    let mut flat = flatten_modules(result);

    if !flat.contains_key("currentPrice") {
        if let Some(price) = flat.get("regularMarketPrice").cloned() {
            flat.insert("currentPrice".to_string(), price);
        }
    }
    if !flat.contains_key("shortName") {
        if let Some(name) = flat.get("longName").cloned() {
            flat.insert("shortName".to_string(), name);
        }
    }

    let mut metrics: MetricsInput = serde_json::from_value(Value::Object(flat.clone()))
        .map_err(|e| AnalysisError::InvalidData(format!("{}: {}", symbol, e)))?;

    // Yahoo has no price/FCF field; derive it from market cap and free cash flow.
    if metrics.price_to_fcf.is_none() {
        let fcf = flat.get("freeCashflow").and_then(|v| v.as_f64());
        if let (Some(cap), Some(fcf)) = (metrics.market_cap, fcf) {
            if cap > 0.0 && fcf > 0.0 {
                metrics.price_to_fcf = Some(cap / fcf);
            }
        }
    }

    match metrics.current_price {
        Some(p) if p.is_finite() && p > 0.0 => Ok(metrics),
        _ => Err(AnalysisError::DataUnavailable(format!(
            "No current price for {}",
            symbol
        ))),
    }
}

/// Parse a chart response into daily bars, oldest first. Rows without a close are
/// skipped; missing open/high/low fall back to the close.
pub fn parse_chart(symbol: &str, body: &Value) -> Result<Vec<Bar>, AnalysisError> {
    let chart = body
        .get("chart")
        .and_then(|v| v.get("result"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| AnalysisError::HistoryUnavailable(format!("No chart data found for {}", symbol)))?;

    let timestamps = chart
        .get("timestamp")
        .and_then(|v| v.as_array())
        .ok_or_else(|| AnalysisError::HistoryUnavailable(format!("No timestamps for {}", symbol)))?;

    let quote = chart
        .get("indicators")
        .and_then(|v| v.get("quote"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| AnalysisError::HistoryUnavailable(format!("No quote data for {}", symbol)))?;

    let series = |name: &str| -> Vec<Option<f64>> {
        quote
            .get(name)
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().map(|v| v.as_f64()).collect())
            .unwrap_or_default()
    };
    let (opens, highs, lows, closes, volumes) =
        (series("open"), series("high"), series("low"), series("close"), series("volume"));

    let at = |s: &[Option<f64>], i: usize| s.get(i).copied().flatten();

    let bars = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let close = at(&closes, i)?;
            let timestamp = DateTime::from_timestamp(ts.as_i64()?, 0)?;
            Some(Bar {
                timestamp,
                open: at(&opens, i).unwrap_or(close),
                high: at(&highs, i).unwrap_or(close),
                low: at(&lows, i).unwrap_or(close),
                close,
                volume: at(&volumes, i).unwrap_or(0.0),
            })
        })
        .collect();

    Ok(bars)
}
