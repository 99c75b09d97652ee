//! Headless charting backend.
//!
//! Implements the charting capability port with plain data structures: every
//! call is recorded and range/crosshair/resize events can be fired
//! synthetically. This is what the logic tests drive instead of a browser;
//! `set_visible_range` re-emits the chart's own range event the way a real
//! charting library notifies subscribers of a programmatic change, which is
//! exactly what the sync bridge's reentrancy guard has to absorb.

use crate::domain::chart::{
    CandlePoint, CandleSeriesOptions, ChartApi, ChartingBackend, CrosshairHandler, CrosshairMove,
    LineSeriesOptions, LogicalRange, RangeHandler, ResizeHandler, SeriesId, SubscriptionId,
    TooltipApi,
};
use crate::domain::errors::{DashboardError, RenderingResult};
use crate::domain::market_data::{BusinessDate, MaPoint};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Shared observable state of one recording tooltip.
#[derive(Default)]
pub struct TooltipState {
    pub lines: RefCell<Vec<String>>,
    pub visible: Cell<bool>,
    pub position: Cell<(f64, f64)>,
    pub removed: Cell<bool>,
}

struct RecordingTooltip {
    state: Rc<TooltipState>,
    events: Rc<RefCell<Vec<String>>>,
}

impl TooltipApi for RecordingTooltip {
    fn set_lines(&self, lines: &[String]) {
        *self.state.lines.borrow_mut() = lines.to_vec();
    }

    fn show_at(&self, left: f64, top: f64) {
        self.state.position.set((left, top));
        self.state.visible.set(true);
    }

    fn hide(&self) {
        self.state.visible.set(false);
    }

    fn remove(&self) {
        self.state.removed.set(true);
        self.events.borrow_mut().push("remove_tooltip".to_string());
    }
}

/// Backend-level switches tests can flip before creating charts.
pub struct RecordingBackend {
    pub available: Cell<bool>,
    pub container_size: Cell<(u32, u32)>,
    pub range_events_supported: Cell<bool>,
    pub crosshair_events_supported: Cell<bool>,
    pub resize_observer_available: Cell<bool>,
    pub fail_set_range: Cell<bool>,
    pub charts: RefCell<Vec<Rc<RecordingChart>>>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            available: Cell::new(true),
            container_size: Cell::new((640, 480)),
            range_events_supported: Cell::new(true),
            crosshair_events_supported: Cell::new(true),
            resize_observer_available: Cell::new(true),
            fail_set_range: Cell::new(false),
            charts: RefCell::new(Vec::new()),
        }
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chart(&self, index: usize) -> Rc<RecordingChart> {
        Rc::clone(&self.charts.borrow()[index])
    }

    pub fn last_chart(&self) -> Rc<RecordingChart> {
        let charts = self.charts.borrow();
        Rc::clone(charts.last().expect("no chart created yet"))
    }

    pub fn chart_count(&self) -> usize {
        self.charts.borrow().len()
    }

    /// Last chart created for a given container that has not been removed.
    pub fn live_chart(&self, container_id: &str) -> Option<Rc<RecordingChart>> {
        self.charts
            .borrow()
            .iter()
            .rev()
            .find(|chart| chart.container_id == container_id && !chart.removed.get())
            .map(Rc::clone)
    }
}

impl ChartingBackend for RecordingBackend {
    fn create_chart(&self, container_id: &str) -> Option<Rc<dyn ChartApi>> {
        if !self.available.get() {
            return None;
        }
        let chart = Rc::new(RecordingChart::new(
            container_id,
            self.container_size.get(),
            self.range_events_supported.get(),
            self.crosshair_events_supported.get(),
            self.resize_observer_available.get(),
            self.fail_set_range.get(),
        ));
        self.charts.borrow_mut().push(Rc::clone(&chart));
        Some(chart)
    }
}

pub struct RecordingChart {
    pub container_id: String,
    pub container_size: Cell<(u32, u32)>,
    pub events: Rc<RefCell<Vec<String>>>,

    pub candle_series: RefCell<Vec<SeriesId>>,
    pub volume_series: RefCell<Vec<SeriesId>>,
    pub line_series: RefCell<Vec<(SeriesId, LineSeriesOptions)>>,
    pub candle_data: RefCell<BTreeMap<SeriesId, Vec<CandlePoint>>>,
    pub line_data: RefCell<BTreeMap<SeriesId, Vec<MaPoint>>>,

    pub applied_dimensions: RefCell<Vec<(u32, u32)>>,
    pub fit_content_calls: Cell<u32>,
    pub visible: Cell<Option<LogicalRange>>,
    pub set_range_calls: RefCell<Vec<LogicalRange>>,
    pub crosshair_positions: RefCell<Vec<(SeriesId, f64, BusinessDate)>>,
    pub clear_crosshair_calls: Cell<u32>,
    pub tooltips: RefCell<Vec<Rc<TooltipState>>>,
    pub removed: Cell<bool>,

    range_supported: bool,
    crosshair_supported: bool,
    resize_supported: bool,
    fail_set_range: bool,

    next_series: Cell<u32>,
    next_subscription: Cell<u64>,
    range_handlers: RefCell<Vec<(SubscriptionId, RangeHandler)>>,
    crosshair_handlers: RefCell<Vec<(SubscriptionId, CrosshairHandler)>>,
    resize_handlers: RefCell<Vec<(SubscriptionId, ResizeHandler)>>,
}

impl RecordingChart {
    fn new(
        container_id: &str,
        container_size: (u32, u32),
        range_supported: bool,
        crosshair_supported: bool,
        resize_supported: bool,
        fail_set_range: bool,
    ) -> Self {
        Self {
            container_id: container_id.to_string(),
            container_size: Cell::new(container_size),
            events: Rc::new(RefCell::new(Vec::new())),
            candle_series: RefCell::new(Vec::new()),
            volume_series: RefCell::new(Vec::new()),
            line_series: RefCell::new(Vec::new()),
            candle_data: RefCell::new(BTreeMap::new()),
            line_data: RefCell::new(BTreeMap::new()),
            applied_dimensions: RefCell::new(Vec::new()),
            fit_content_calls: Cell::new(0),
            visible: Cell::new(None),
            set_range_calls: RefCell::new(Vec::new()),
            crosshair_positions: RefCell::new(Vec::new()),
            clear_crosshair_calls: Cell::new(0),
            tooltips: RefCell::new(Vec::new()),
            removed: Cell::new(false),
            range_supported,
            crosshair_supported,
            resize_supported,
            fail_set_range,
            next_series: Cell::new(0),
            next_subscription: Cell::new(0),
            range_handlers: RefCell::new(Vec::new()),
            crosshair_handlers: RefCell::new(Vec::new()),
            resize_handlers: RefCell::new(Vec::new()),
        }
    }

    fn next_series_id(&self) -> SeriesId {
        let id = self.next_series.get();
        self.next_series.set(id + 1);
        SeriesId(id)
    }

    fn next_subscription_id(&self) -> SubscriptionId {
        let id = self.next_subscription.get() + 1;
        self.next_subscription.set(id);
        SubscriptionId(id)
    }

    /// Fire a visible-range change the way a user pan/zoom would.
    pub fn emit_range(&self, range: Option<LogicalRange>) {
        if let Some(range) = range {
            self.visible.set(Some(range));
        }
        for (_, handler) in self.range_handlers.borrow().iter() {
            handler(range);
        }
    }

    /// Fire a crosshair move the way a pointer move would.
    pub fn emit_crosshair(&self, param: &CrosshairMove) {
        for (_, handler) in self.crosshair_handlers.borrow().iter() {
            handler(param);
        }
    }

    /// Fire a container box-size change.
    pub fn emit_resize(&self, width: u32, height: u32) {
        self.container_size.set((width, height));
        for (_, handler) in self.resize_handlers.borrow().iter() {
            handler(width, height);
        }
    }

    pub fn range_handler_count(&self) -> usize {
        self.range_handlers.borrow().len()
    }

    pub fn crosshair_handler_count(&self) -> usize {
        self.crosshair_handlers.borrow().len()
    }

    pub fn resize_handler_count(&self) -> usize {
        self.resize_handlers.borrow().len()
    }

    pub fn tooltip(&self) -> Rc<TooltipState> {
        Rc::clone(self.tooltips.borrow().first().expect("no tooltip created"))
    }
}

impl ChartApi for RecordingChart {
    fn add_candlestick_series(&self, _options: &CandleSeriesOptions) -> Option<SeriesId> {
        let id = self.next_series_id();
        self.candle_series.borrow_mut().push(id);
        Some(id)
    }

    fn add_volume_series(&self, _options: &CandleSeriesOptions) -> Option<SeriesId> {
        let id = self.next_series_id();
        self.volume_series.borrow_mut().push(id);
        Some(id)
    }

    fn add_line_series(&self, options: &LineSeriesOptions) -> Option<SeriesId> {
        let id = self.next_series_id();
        self.line_series.borrow_mut().push((id, options.clone()));
        Some(id)
    }

    fn set_candle_data(&self, series: SeriesId, data: &[CandlePoint]) {
        self.candle_data.borrow_mut().insert(series, data.to_vec());
    }

    fn set_line_data(&self, series: SeriesId, data: &[MaPoint]) {
        self.line_data.borrow_mut().insert(series, data.to_vec());
    }

    fn apply_dimensions(&self, width: u32, height: u32) {
        self.applied_dimensions.borrow_mut().push((width, height));
    }

    fn fit_content(&self) {
        self.fit_content_calls.set(self.fit_content_calls.get() + 1);
    }

    fn container_size(&self) -> (u32, u32) {
        self.container_size.get()
    }

    fn supports_range_events(&self) -> bool {
        self.range_supported
    }

    fn supports_crosshair_events(&self) -> bool {
        self.crosshair_supported
    }

    fn visible_range(&self) -> Option<LogicalRange> {
        self.visible.get()
    }

    fn set_visible_range(&self, range: LogicalRange) -> RenderingResult<()> {
        self.set_range_calls.borrow_mut().push(range);
        if self.fail_set_range {
            return Err(DashboardError::RenderingError("synthetic range failure".to_string()));
        }
        self.visible.set(Some(range));
        // A programmatic range change notifies this chart's own
        // subscribers, same as the real library.
        for (_, handler) in self.range_handlers.borrow().iter() {
            handler(Some(range));
        }
        Ok(())
    }

    fn subscribe_visible_range(&self, handler: RangeHandler) -> SubscriptionId {
        let id = self.next_subscription_id();
        self.range_handlers.borrow_mut().push((id, handler));
        id
    }

    fn unsubscribe_visible_range(&self, id: SubscriptionId) {
        self.range_handlers.borrow_mut().retain(|(sub, _)| *sub != id);
    }

    fn subscribe_crosshair(&self, handler: CrosshairHandler) -> SubscriptionId {
        let id = self.next_subscription_id();
        self.crosshair_handlers.borrow_mut().push((id, handler));
        id
    }

    fn unsubscribe_crosshair(&self, id: SubscriptionId) {
        self.events.borrow_mut().push("unsubscribe_crosshair".to_string());
        self.crosshair_handlers.borrow_mut().retain(|(sub, _)| *sub != id);
    }

    fn set_crosshair(
        &self,
        series: SeriesId,
        price: f64,
        time: BusinessDate,
    ) -> RenderingResult<()> {
        self.crosshair_positions.borrow_mut().push((series, price, time));
        Ok(())
    }

    fn clear_crosshair(&self) -> RenderingResult<()> {
        self.clear_crosshair_calls.set(self.clear_crosshair_calls.get() + 1);
        Ok(())
    }

    fn observe_resize(&self, handler: ResizeHandler) -> Option<SubscriptionId> {
        if !self.resize_supported {
            return None;
        }
        let id = self.next_subscription_id();
        self.resize_handlers.borrow_mut().push((id, handler));
        Some(id)
    }

    fn unobserve_resize(&self, id: SubscriptionId) {
        self.events.borrow_mut().push("unobserve_resize".to_string());
        self.resize_handlers.borrow_mut().retain(|(sub, _)| *sub != id);
    }

    fn create_tooltip(&self) -> Option<Box<dyn TooltipApi>> {
        let state = Rc::new(TooltipState::default());
        self.tooltips.borrow_mut().push(Rc::clone(&state));
        Some(Box::new(RecordingTooltip { state, events: Rc::clone(&self.events) }))
    }

    fn remove(&self) {
        self.removed.set(true);
        self.events.borrow_mut().push("remove_chart".to_string());
        self.range_handlers.borrow_mut().clear();
        self.crosshair_handlers.borrow_mut().clear();
        self.resize_handlers.borrow_mut().clear();
    }
}
