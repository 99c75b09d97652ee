use super::entities::CandleRow;
use super::value_objects::{BusinessDate, coerce_finite};
use crate::domain::logging::{LogComponent, get_logger};
use serde::Deserialize;
use serde_json::Value;

/// Raw OHLCV record as consumed from the data source.
///
/// Numeric fields may arrive as JSON numbers or numeric strings, so they are
/// kept as raw values until coercion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOhlcvRecord {
    #[serde(default)]
    pub trade_date: String,
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
}

/// The single point where malformed upstream rows are filtered.
///
/// A record is dropped when its date fails to parse or any of
/// open/high/low/close fails permissive coercion. Volume is non-essential:
/// it falls back to 0 instead of rejecting the row. Input order is
/// preserved; no sorting happens here.
pub fn build_candle_rows(items: &[RawOhlcvRecord]) -> Vec<CandleRow> {
    let mut rows = Vec::with_capacity(items.len());
    for record in items {
        let Some(time) = BusinessDate::parse(&record.trade_date) else {
            continue;
        };
        let (Some(open), Some(high), Some(low), Some(close)) = (
            coerce_finite(&record.open),
            coerce_finite(&record.high),
            coerce_finite(&record.low),
            coerce_finite(&record.close),
        ) else {
            continue;
        };
        let volume = coerce_finite(&record.volume).unwrap_or(0.0);
        rows.push(CandleRow {
            time,
            open,
            high,
            low,
            close,
            volume,
            trade_date: record.trade_date.clone(),
        });
    }

    if rows.len() < items.len() {
        get_logger().debug(
            LogComponent::Domain("CandleBuilder"),
            &format!("dropped {} malformed of {} raw rows", items.len() - rows.len(), items.len()),
        );
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(date: &str, close: Value) -> RawOhlcvRecord {
        RawOhlcvRecord {
            trade_date: date.to_string(),
            open: json!(10),
            high: json!(12),
            low: json!(9),
            close,
            volume: json!(100),
        }
    }

    #[test]
    fn keeps_rows_with_numeric_strings() {
        let rows = build_candle_rows(&[record("2024-01-02", json!("10.5"))]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].close, 10.5);
    }

    #[test]
    fn drops_rows_with_bad_date_or_ohlc() {
        let rows = build_candle_rows(&[
            record("2024-01", json!(10)),
            record("2024-01-02", json!("n/a")),
            record("2024-01-03", json!(11)),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].trade_date, "2024-01-03");
    }

    #[test]
    fn bad_volume_defaults_to_zero() {
        let mut raw = record("2024-01-02", json!(10));
        raw.volume = json!("unknown");
        let rows = build_candle_rows(&[raw]);
        assert_eq!(rows[0].volume, 0.0);
    }
}
