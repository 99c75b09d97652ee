use crate::domain::market_data::{BusinessDate, CandleRow};

// Chart styling as shipped by the collector dashboard. KRX convention:
// red bullish, blue bearish.
pub const BULL_COLOR: &str = "#dc2626";
pub const BEAR_COLOR: &str = "#2563eb";
pub const BULL_VOLUME_COLOR: &str = "rgba(220,38,38,0.45)";
pub const BEAR_VOLUME_COLOR: &str = "rgba(37,99,235,0.45)";
pub const PRICE_SCALE_MIN_WIDTH: u32 = 80;

/// Floor applied to chart dimensions so a collapsed container never
/// produces a zero-size render.
pub const MIN_CHART_WIDTH: u32 = 320;
pub const MIN_CHART_HEIGHT: u32 = 320;

/// Visible logical range of a time scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalRange {
    pub from: f64,
    pub to: f64,
}

/// Crosshair pointer position in chart plot coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

impl ChartPoint {
    /// Negative coordinates mean the pointer left the plot area.
    pub fn is_inside(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x >= 0.0 && self.y >= 0.0
    }
}

/// Identity of a series within its chart, assigned by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesId(pub u32);

/// Per-series datum carried by a crosshair-move event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesSample {
    Candle { open: f64, high: f64, low: f64, close: f64 },
    Line { value: f64 },
}

/// Crosshair-move event payload.
#[derive(Debug, Clone, Default)]
pub struct CrosshairMove {
    pub time: Option<BusinessDate>,
    pub point: Option<ChartPoint>,
    pub samples: Vec<(SeriesId, SeriesSample)>,
}

impl CrosshairMove {
    pub fn sample(&self, series: SeriesId) -> Option<SeriesSample> {
        self.samples.iter().find(|(id, _)| *id == series).map(|(_, sample)| *sample)
    }

    pub fn is_point_inside(&self) -> bool {
        self.point.map(|point| point.is_inside()).unwrap_or(false)
    }
}

/// One candle-shaped datum handed to the charting adapter. An explicit
/// color overrides the series up/down colors (used by volume bars).
#[derive(Debug, Clone, PartialEq)]
pub struct CandlePoint {
    pub time: BusinessDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub color: Option<&'static str>,
}

pub fn price_candle_point(row: &CandleRow) -> CandlePoint {
    CandlePoint {
        time: row.time,
        open: row.open,
        high: row.high,
        low: row.low,
        close: row.close,
        color: None,
    }
}

/// Volume rendered with the candle idiom: a zero-based bar whose color
/// follows the row's own open/close direction, not the price candle's.
pub fn volume_candle_point(row: &CandleRow) -> CandlePoint {
    let color = if row.is_bullish() { BULL_VOLUME_COLOR } else { BEAR_VOLUME_COLOR };
    CandlePoint {
        time: row.time,
        open: 0.0,
        high: row.volume,
        low: 0.0,
        close: row.volume,
        color: Some(color),
    }
}

/// Style of a candlestick series.
#[derive(Debug, Clone)]
pub struct CandleSeriesOptions {
    pub up_color: &'static str,
    pub down_color: &'static str,
}

impl Default for CandleSeriesOptions {
    fn default() -> Self {
        Self { up_color: BULL_COLOR, down_color: BEAR_COLOR }
    }
}

/// Style of an overlay line series.
#[derive(Debug, Clone)]
pub struct LineSeriesOptions {
    pub color: &'static str,
    pub line_width: f64,
    /// Anchors the line to the volume price scale instead of the right one.
    pub on_volume_scale: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(bullish: bool) -> CandleRow {
        CandleRow {
            time: BusinessDate::new(2024, 1, 2),
            open: 10.0,
            high: 12.0,
            low: 9.0,
            close: if bullish { 11.0 } else { 9.5 },
            volume: 42.0,
            trade_date: "2024-01-02".to_string(),
        }
    }

    #[test]
    fn volume_point_is_zero_based_and_direction_colored() {
        let up = volume_candle_point(&row(true));
        assert_eq!((up.open, up.low), (0.0, 0.0));
        assert_eq!((up.high, up.close), (42.0, 42.0));
        assert_eq!(up.color, Some(BULL_VOLUME_COLOR));
        assert_eq!(volume_candle_point(&row(false)).color, Some(BEAR_VOLUME_COLOR));
    }

    #[test]
    fn out_of_plot_points_are_outside() {
        assert!(ChartPoint { x: 0.0, y: 5.0 }.is_inside());
        assert!(!ChartPoint { x: -1.0, y: 5.0 }.is_inside());
        assert!(!ChartPoint { x: 4.0, y: f64::NAN }.is_inside());
    }
}
