//! Chart context lifecycle: create, render, dispose.
//!
//! A context bundles one chart, its candle and volume series, the MA
//! overlay lines, the tooltip overlay and the resize/crosshair
//! subscriptions. Exactly one live context exists per container slot;
//! replacement is always dispose-old-then-create-new.

use crate::domain::chart::{
    CandleSeriesOptions, ChartApi, ChartPoint, ChartingBackend, CrosshairMove, LineSeriesOptions,
    MIN_CHART_HEIGHT, MIN_CHART_WIDTH, SeriesId, SeriesSample, SubscriptionId, TooltipApi,
    price_candle_point, volume_candle_point,
};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{CandleRowSet, compute_sma, ma_color, ma_label};
use std::rc::Rc;

/// Tooltip geometry: keep the box off the container's right edge and below
/// its top edge.
const TOOLTIP_POINTER_GAP_X: f64 = 16.0;
const TOOLTIP_POINTER_LIFT_Y: f64 = 12.0;
const TOOLTIP_BOX_ALLOWANCE: f64 = 180.0;
const TOOLTIP_TOP_MARGIN: f64 = 8.0;

/// One rendered moving-average overlay line.
#[derive(Debug, Clone)]
pub struct OverlaySeries {
    pub label: String,
    pub period: u32,
    pub series: SeriesId,
}

pub struct ChartContext {
    chart: Rc<dyn ChartApi>,
    candles: SeriesId,
    volume: SeriesId,
    overlays: Vec<OverlaySeries>,
    tooltip: Option<Rc<dyn TooltipApi>>,
    rows: Rc<CandleRowSet>,
    resize_sub: Option<SubscriptionId>,
    crosshair_sub: Option<SubscriptionId>,
    disposed: bool,
}

impl ChartContext {
    /// Bind a fresh chart to a container. None means rendering is
    /// unavailable (missing container or charting capability); callers fall
    /// back to tables and messages, never treat this as fatal.
    pub fn create(backend: &dyn ChartingBackend, container_id: &str) -> Option<Self> {
        let chart = backend.create_chart(container_id)?;

        let (width, height) = chart.container_size();
        chart.apply_dimensions(width.max(MIN_CHART_WIDTH), height.max(MIN_CHART_HEIGHT));

        let candles = chart.add_candlestick_series(&CandleSeriesOptions::default());
        let volume = chart.add_volume_series(&CandleSeriesOptions::default());
        let (Some(candles), Some(volume)) = (candles, volume) else {
            chart.remove();
            return None;
        };

        let tooltip = chart.create_tooltip().map(Rc::from);

        Some(Self {
            chart,
            candles,
            volume,
            overlays: Vec::new(),
            tooltip,
            rows: Rc::new(CandleRowSet::default()),
            resize_sub: None,
            crosshair_sub: None,
            disposed: false,
        })
    }

    /// Push a row set plus its MA overlays into the chart, then bind the
    /// tooltip and resize handlers and fit the visible range to all data.
    /// Callers guarantee `rows` is non-empty (the empty case is surfaced as
    /// a no-data message instead of an empty chart).
    pub fn render(
        &mut self,
        rows: CandleRowSet,
        price_periods: &[u32],
        volume_periods: &[u32],
    ) {
        self.rows = Rc::new(rows);
        self.overlays.clear();

        let candle_points: Vec<_> = self.rows.rows().iter().map(price_candle_point).collect();
        let volume_points: Vec<_> = self.rows.rows().iter().map(volume_candle_point).collect();
        self.chart.set_candle_data(self.candles, &candle_points);
        self.chart.set_candle_data(self.volume, &volume_points);

        for (idx, &period) in price_periods.iter().enumerate() {
            let options = LineSeriesOptions {
                color: ma_color(idx),
                line_width: 1.5,
                on_volume_scale: false,
            };
            let Some(series) = self.chart.add_line_series(&options) else { continue };
            let points = compute_sma(self.rows.rows(), period as usize, |row| row.close);
            self.chart.set_line_data(series, &points);
            self.overlays.push(OverlaySeries { label: ma_label(period), period, series });
        }
        for (idx, &period) in volume_periods.iter().enumerate() {
            let options = LineSeriesOptions {
                // Volume overlays continue the palette where price overlays stop.
                color: ma_color(idx + price_periods.len()),
                line_width: 1.2,
                on_volume_scale: true,
            };
            let Some(series) = self.chart.add_line_series(&options) else { continue };
            let points = compute_sma(self.rows.rows(), period as usize, |row| row.volume);
            self.chart.set_line_data(series, &points);
            self.overlays.push(OverlaySeries {
                label: format!("V {}", ma_label(period)),
                period,
                series,
            });
        }

        self.bind_tooltip();
        self.bind_resize();
        self.chart.fit_content();
    }

    fn bind_tooltip(&mut self) {
        if let Some(id) = self.crosshair_sub.take() {
            self.chart.unsubscribe_crosshair(id);
        }
        let Some(tooltip) = self.tooltip.clone() else { return };
        let chart = Rc::clone(&self.chart);
        let rows = Rc::clone(&self.rows);
        let overlays: Vec<(SeriesId, String)> =
            self.overlays.iter().map(|o| (o.series, o.label.clone())).collect();

        let handler = move |param: &CrosshairMove| {
            let (Some(time), Some(point)) = (param.time, param.point) else {
                tooltip.hide();
                return;
            };
            if !point.is_inside() {
                tooltip.hide();
                return;
            }
            // Exact lookup by the three date fields, not the compact key.
            let Some(row) = rows.by_date(time) else {
                tooltip.hide();
                return;
            };

            let mut lines = vec![
                row.trade_date.clone(),
                format!("O: {}", format_amount(row.open, 2)),
                format!("H: {}", format_amount(row.high, 2)),
                format!("L: {}", format_amount(row.low, 2)),
                format!("C: {}", format_amount(row.close, 2)),
                format!("V: {}", format_amount(row.volume, 0)),
            ];
            for (series, label) in &overlays {
                let value = match param.sample(*series) {
                    Some(SeriesSample::Line { value }) => format_amount(value, 2),
                    _ => "-".to_string(),
                };
                lines.push(format!("{}: {}", label, value));
            }
            tooltip.set_lines(&lines);

            let (width, _) = chart.container_size();
            let (left, top) = tooltip_placement(point, width);
            tooltip.show_at(left, top);
        };

        self.crosshair_sub = Some(self.chart.subscribe_crosshair(Box::new(handler)));
    }

    fn bind_resize(&mut self) {
        if let Some(id) = self.resize_sub.take() {
            self.chart.unobserve_resize(id);
        }
        let chart = Rc::clone(&self.chart);
        self.resize_sub = self.chart.observe_resize(Box::new(move |width, height| {
            chart.apply_dimensions(width.max(MIN_CHART_WIDTH), height.max(MIN_CHART_HEIGHT));
        }));
    }

    /// Re-apply dimensions from the container's current size (window-level
    /// resize path; the observer handles container-level changes).
    pub fn resize_to_container(&self) {
        let (width, height) = self.chart.container_size();
        self.chart.apply_dimensions(width.max(MIN_CHART_WIDTH), height.max(MIN_CHART_HEIGHT));
    }

    /// Tear the context down: resize observation first, then the crosshair
    /// subscription, then the tooltip node, then the chart itself, so no
    /// callback can fire against a partially-removed chart. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(id) = self.resize_sub.take() {
            self.chart.unobserve_resize(id);
        }
        if let Some(id) = self.crosshair_sub.take() {
            self.chart.unsubscribe_crosshair(id);
        }
        if let Some(tooltip) = self.tooltip.take() {
            tooltip.remove();
        }
        self.chart.remove();
        get_logger().debug(LogComponent::Application("ChartContext"), "chart context disposed");
    }

    pub fn chart(&self) -> Rc<dyn ChartApi> {
        Rc::clone(&self.chart)
    }

    pub fn candle_series(&self) -> SeriesId {
        self.candles
    }

    pub fn rows(&self) -> Rc<CandleRowSet> {
        Rc::clone(&self.rows)
    }

    pub fn overlays(&self) -> &[OverlaySeries] {
        &self.overlays
    }
}

/// Dispose whatever occupies a context slot. Disposing an empty slot is a
/// no-op; the slot is left empty either way so a replacement can be created.
pub fn dispose_slot(slot: &mut Option<ChartContext>) {
    if let Some(mut context) = slot.take() {
        context.dispose();
    }
}

/// Clamp the tooltip next to the pointer: never past the container's right
/// edge, never above its top edge.
pub fn tooltip_placement(point: ChartPoint, container_width: u32) -> (f64, f64) {
    let left = (point.x + TOOLTIP_POINTER_GAP_X)
        .min((container_width as f64 - TOOLTIP_BOX_ALLOWANCE).max(0.0));
    let top = (point.y - TOOLTIP_POINTER_LIFT_Y).max(TOOLTIP_TOP_MARGIN);
    (left, top)
}

/// Thousands-separated display formatting; non-finite values render as "-".
pub fn format_amount(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let formatted = format!("{:.*}", digits, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };
    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_are_thousands_grouped() {
        assert_eq!(format_amount(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_amount(987.0, 0), "987");
        assert_eq!(format_amount(-4200.5, 2), "-4,200.50");
        assert_eq!(format_amount(f64::NAN, 2), "-");
    }

    #[test]
    fn tooltip_clamps_to_container_edges() {
        // Room to the right: follows the pointer with a gap.
        assert_eq!(tooltip_placement(ChartPoint { x: 100.0, y: 50.0 }, 800), (116.0, 38.0));
        // Pointer near the right edge: clamped to width - allowance.
        assert_eq!(tooltip_placement(ChartPoint { x: 700.0, y: 50.0 }, 800), (620.0, 38.0));
        // Pointer near the top: floored at the margin.
        assert_eq!(tooltip_placement(ChartPoint { x: 10.0, y: 2.0 }, 800).1, 8.0);
        // Tiny container: left never goes negative.
        assert_eq!(tooltip_placement(ChartPoint { x: 0.0, y: 50.0 }, 100).0, 0.0);
    }
}
