//! Charting capability port.
//!
//! The dashboard never talks to a charting library directly; it talks to
//! this interface. One adapter exists per supported library version and is
//! selected once at startup. If no adapter is available the dashboard
//! degrades to tables and messages instead of charts.

use super::value_objects::{
    CandlePoint, CandleSeriesOptions, CrosshairMove, LineSeriesOptions, LogicalRange, SeriesId,
};
use crate::domain::errors::RenderingResult;
use crate::domain::market_data::{BusinessDate, MaPoint};
use std::rc::Rc;

/// Handle of an event subscription, used for targeted unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

pub type RangeHandler = Box<dyn Fn(Option<LogicalRange>)>;
pub type CrosshairHandler = Box<dyn Fn(&CrosshairMove)>;
pub type ResizeHandler = Box<dyn Fn(u32, u32)>;

/// Entry point of a charting adapter: binds a chart to a container element.
///
/// Returns None when the container is absent or the library is unavailable;
/// callers treat that as "rendering unavailable", never as a fatal error.
pub trait ChartingBackend {
    fn create_chart(&self, container_id: &str) -> Option<Rc<dyn ChartApi>>;
}

/// One live chart plus its container, as exposed by the adapter.
///
/// Event subscriptions are fire-and-forget listeners; handlers must stay
/// cheap because crosshair events fire at pointer-move frequency.
pub trait ChartApi {
    fn add_candlestick_series(&self, options: &CandleSeriesOptions) -> Option<SeriesId>;
    /// Candle-shaped volume series on its own price scale anchored to the
    /// chart's bottom margin.
    fn add_volume_series(&self, options: &CandleSeriesOptions) -> Option<SeriesId>;
    fn add_line_series(&self, options: &LineSeriesOptions) -> Option<SeriesId>;

    fn set_candle_data(&self, series: SeriesId, data: &[CandlePoint]);
    fn set_line_data(&self, series: SeriesId, data: &[MaPoint]);

    fn apply_dimensions(&self, width: u32, height: u32);
    fn fit_content(&self);
    fn container_size(&self) -> (u32, u32);

    fn supports_range_events(&self) -> bool;
    fn supports_crosshair_events(&self) -> bool;

    fn visible_range(&self) -> Option<LogicalRange>;
    fn set_visible_range(&self, range: LogicalRange) -> RenderingResult<()>;
    fn subscribe_visible_range(&self, handler: RangeHandler) -> SubscriptionId;
    fn unsubscribe_visible_range(&self, id: SubscriptionId);

    fn subscribe_crosshair(&self, handler: CrosshairHandler) -> SubscriptionId;
    fn unsubscribe_crosshair(&self, id: SubscriptionId);
    /// Place the crosshair at `price` on `series` at the given time.
    fn set_crosshair(&self, series: SeriesId, price: f64, time: BusinessDate)
    -> RenderingResult<()>;
    fn clear_crosshair(&self) -> RenderingResult<()>;

    /// Observe the container's box size. None when the environment has no
    /// resize observation; disposal must stop the observation.
    fn observe_resize(&self, handler: ResizeHandler) -> Option<SubscriptionId>;
    fn unobserve_resize(&self, id: SubscriptionId);

    /// DOM-overlay tooltip element attached to the container.
    fn create_tooltip(&self) -> Option<Box<dyn TooltipApi>>;

    /// Release the chart instance. Called last during disposal.
    fn remove(&self);
}

/// The tooltip overlay attached to one chart container.
pub trait TooltipApi {
    fn set_lines(&self, lines: &[String]);
    fn show_at(&self, left: f64, top: f64);
    fn hide(&self);
    /// Detach the element from the container.
    fn remove(&self);
}
