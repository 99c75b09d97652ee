use super::value_objects::BusinessDate;
use std::collections::HashMap;

/// Domain entity - one validated daily candle
///
/// Produced fresh per load by the candle builder; open/high/low/close are
/// guaranteed finite, volume defaults to 0 when the feed value is unusable.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleRow {
    pub time: BusinessDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Source date string as delivered by the feed, for tooltip display.
    pub trade_date: String,
}

impl CandleRow {
    /// Volume bars are colored by this row's own direction, never by the
    /// price candle next to them.
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// Domain entity - the rendered row set of one chart
///
/// Keeps rows in feed order (ascending time is the caller's contract) plus a
/// compact-key lookup used for cross-calendar crosshair translation.
#[derive(Debug, Clone, Default)]
pub struct CandleRowSet {
    rows: Vec<CandleRow>,
    by_key: HashMap<String, usize>,
}

impl CandleRowSet {
    pub fn new(rows: Vec<CandleRow>) -> Self {
        let by_key = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (row.time.compact_key(), idx))
            .collect();
        Self { rows, by_key }
    }

    pub fn rows(&self) -> &[CandleRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Lookup by compact `YYYYMMDD` key (the cross-chart mechanism).
    pub fn by_compact_key(&self, key: &str) -> Option<&CandleRow> {
        self.by_key.get(key).map(|idx| &self.rows[*idx])
    }

    /// Exact lookup by the three date fields (the tooltip mechanism).
    pub fn by_date(&self, time: BusinessDate) -> Option<&CandleRow> {
        self.rows.iter().find(|row| row.time == time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, close: f64) -> CandleRow {
        let time = BusinessDate::parse(date).unwrap();
        CandleRow {
            time,
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 10.0,
            trade_date: date.to_string(),
        }
    }

    #[test]
    fn compact_key_lookup_finds_rows() {
        let set = CandleRowSet::new(vec![row("2024-01-02", 10.0), row("2024-01-04", 11.0)]);
        assert_eq!(set.by_compact_key("20240104").map(|r| r.close), Some(11.0));
        assert!(set.by_compact_key("20240103").is_none());
    }

    #[test]
    fn exact_date_lookup_matches_all_three_fields() {
        let set = CandleRowSet::new(vec![row("2024-01-02", 10.0)]);
        assert!(set.by_date(BusinessDate::new(2024, 1, 2)).is_some());
        assert!(set.by_date(BusinessDate::new(2023, 1, 2)).is_none());
    }

    #[test]
    fn doji_counts_as_bullish() {
        let mut r = row("2024-01-02", 10.0);
        r.open = r.close;
        assert!(r.is_bullish());
    }
}
