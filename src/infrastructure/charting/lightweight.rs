//! LightweightCharts adapter.
//!
//! One adapter per supported library major version: v4 creates series with
//! `chart.addCandlestickSeries(...)`, v5 with
//! `chart.addSeries(LightweightCharts.CandlestickSeries, ...)`. The version
//! is probed exactly once in `select_backend`; after that every call goes
//! through the chosen mode with no per-call capability detection.

use crate::domain::chart::{
    CandlePoint, CandleSeriesOptions, ChartApi, ChartPoint, ChartingBackend, CrosshairHandler,
    CrosshairMove, LineSeriesOptions, LogicalRange, MIN_CHART_HEIGHT, MIN_CHART_WIDTH,
    RangeHandler, ResizeHandler, SeriesId, SeriesSample, SubscriptionId, TooltipApi,
};
use crate::domain::errors::{DashboardError, RenderingResult};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{BusinessDate, MaPoint};
use js_sys::{Array, Function, Object, Reflect};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlDivElement, ResizeObserver};

const TOOLTIP_BASE_STYLE: &str = "position:absolute;background:rgba(15,23,42,0.92);color:#f8fafc;\
    padding:8px 12px;border-radius:6px;font-size:12px;line-height:1.5;white-space:pre-line;\
    pointer-events:none;z-index:1000;";

fn get(target: &JsValue, key: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

fn set(target: &JsValue, key: &str, value: &JsValue) {
    let _ = Reflect::set(target, &JsValue::from_str(key), value);
}

fn method(target: &JsValue, name: &str) -> Option<Function> {
    get(target, name).dyn_into::<Function>().ok()
}

fn call0(target: &JsValue, name: &str) -> Result<JsValue, JsValue> {
    method(target, name)
        .ok_or_else(|| JsValue::from_str(&format!("missing method {}", name)))?
        .call0(target)
}

fn call1(target: &JsValue, name: &str, arg: &JsValue) -> Result<JsValue, JsValue> {
    method(target, name)
        .ok_or_else(|| JsValue::from_str(&format!("missing method {}", name)))?
        .call1(target, arg)
}

fn call2(target: &JsValue, name: &str, a: &JsValue, b: &JsValue) -> Result<JsValue, JsValue> {
    method(target, name)
        .ok_or_else(|| JsValue::from_str(&format!("missing method {}", name)))?
        .call2(target, a, b)
}

fn call3(
    target: &JsValue,
    name: &str,
    a: &JsValue,
    b: &JsValue,
    c: &JsValue,
) -> Result<JsValue, JsValue> {
    method(target, name)
        .ok_or_else(|| JsValue::from_str(&format!("missing method {}", name)))?
        .call3(target, a, b, c)
}

fn rendering_error(context: &str, err: JsValue) -> DashboardError {
    DashboardError::RenderingError(format!("{}: {:?}", context, err))
}

fn business_date_to_js(time: BusinessDate) -> JsValue {
    let obj = Object::new();
    set(&obj, "year", &JsValue::from_f64(time.year as f64));
    set(&obj, "month", &JsValue::from_f64(time.month as f64));
    set(&obj, "day", &JsValue::from_f64(time.day as f64));
    obj.into()
}

fn business_date_from_js(value: &JsValue) -> Option<BusinessDate> {
    if !value.is_object() {
        return None;
    }
    let year = get(value, "year").as_f64()?;
    let month = get(value, "month").as_f64()?;
    let day = get(value, "day").as_f64()?;
    Some(BusinessDate::new(year as i32, month as i32, day as i32))
}

fn logical_range_from_js(value: &JsValue) -> Option<LogicalRange> {
    if !value.is_object() {
        return None;
    }
    let from = get(value, "from").as_f64()?;
    let to = get(value, "to").as_f64()?;
    Some(LogicalRange { from, to })
}

/// How the selected library version creates series.
enum SeriesMode {
    /// v4: `chart.addCandlestickSeries(options)` and friends.
    Methods,
    /// v5: `chart.addSeries(SeriesType, options)`.
    Definitions { candlestick: JsValue, line: JsValue },
}

/// Adapter over the global `window.LightweightCharts`, selected once at
/// startup. None when the library is not loaded.
pub struct LightweightBackend {
    namespace: JsValue,
    mode: SeriesMode,
}

/// Probe the global namespace and pick the adapter for the loaded library
/// version. Called once during startup.
pub fn select_backend() -> Option<Rc<dyn ChartingBackend>> {
    let window = web_sys::window()?;
    let namespace = get(&window.into(), "LightweightCharts");
    if !namespace.is_object() {
        get_logger().warn(
            LogComponent::Infrastructure("Charting"),
            "LightweightCharts global not found; charts disabled",
        );
        return None;
    }
    method(&namespace, "createChart")?;

    let candlestick = get(&namespace, "CandlestickSeries");
    let line = get(&namespace, "LineSeries");
    let mode = if !candlestick.is_undefined() && !line.is_undefined() {
        get_logger().info(
            LogComponent::Infrastructure("Charting"),
            "using LightweightCharts v5 adapter",
        );
        SeriesMode::Definitions { candlestick, line }
    } else {
        get_logger().info(
            LogComponent::Infrastructure("Charting"),
            "using LightweightCharts v4 adapter",
        );
        SeriesMode::Methods
    };
    Some(Rc::new(LightweightBackend { namespace, mode }))
}

impl LightweightBackend {
    fn chart_options(width: u32, height: u32, tick_formatter: &Function) -> JsValue {
        let options = Object::new();
        set(&options, "width", &JsValue::from_f64(width as f64));
        set(&options, "height", &JsValue::from_f64(height as f64));

        let layout = Object::new();
        let background = Object::new();
        set(&background, "color", &JsValue::from_str("#ffffff"));
        set(&layout, "background", &background);
        set(&layout, "textColor", &JsValue::from_str("#334155"));
        set(&options, "layout", &layout);

        let grid = Object::new();
        let grid_line = Object::new();
        set(&grid_line, "color", &JsValue::from_str("#eef2f7"));
        set(&grid, "vertLines", &grid_line);
        set(&grid, "horzLines", &grid_line);
        set(&options, "grid", &grid);

        let time_scale = Object::new();
        set(&time_scale, "borderColor", &JsValue::from_str("#cbd5e1"));
        // Daily candles render date labels, not 00:00 time labels.
        set(&time_scale, "timeVisible", &JsValue::FALSE);
        set(&time_scale, "secondsVisible", &JsValue::FALSE);
        set(&time_scale, "tickMarkFormatter", tick_formatter);
        set(&options, "timeScale", &time_scale);

        let right_scale = Object::new();
        set(&right_scale, "borderColor", &JsValue::from_str("#cbd5e1"));
        let margins = Object::new();
        set(&margins, "top", &JsValue::from_f64(0.08));
        set(&margins, "bottom", &JsValue::from_f64(0.34));
        set(&right_scale, "scaleMargins", &margins);
        set(
            &right_scale,
            "minimumWidth",
            &JsValue::from_f64(crate::domain::chart::PRICE_SCALE_MIN_WIDTH as f64),
        );
        set(&options, "rightPriceScale", &right_scale);

        let localization = Object::new();
        // Crosshair/date labels stay consistent with x-axis tick labels.
        set(&localization, "timeFormatter", tick_formatter);
        set(&options, "localization", &localization);

        options.into()
    }
}

impl ChartingBackend for LightweightBackend {
    fn create_chart(&self, container_id: &str) -> Option<Rc<dyn ChartApi>> {
        let document = web_sys::window()?.document()?;
        let container: HtmlDivElement =
            document.get_element_by_id(container_id)?.dyn_into().ok()?;

        let width = (container.client_width().max(0) as u32).max(MIN_CHART_WIDTH);
        let height = (container.client_height().max(0) as u32).max(MIN_CHART_HEIGHT);

        let tick_formatter = Closure::<dyn Fn(JsValue) -> JsValue>::new(|time: JsValue| {
            match business_date_from_js(&time) {
                Some(date) => JsValue::from_str(&date.compact_key()),
                None => JsValue::from_str(""),
            }
        });
        let options =
            Self::chart_options(width, height, tick_formatter.as_ref().unchecked_ref());

        let create = method(&self.namespace, "createChart")?;
        let container_js: JsValue = container.clone().into();
        let chart = create.call2(&self.namespace, &container_js, &options).ok()?;
        if !chart.is_object() {
            return None;
        }

        let series_mode = match &self.mode {
            SeriesMode::Methods => SeriesMode::Methods,
            SeriesMode::Definitions { candlestick, line } => SeriesMode::Definitions {
                candlestick: candlestick.clone(),
                line: line.clone(),
            },
        };

        Some(Rc::new(LightweightChart {
            chart,
            container,
            mode: series_mode,
            next_series: Cell::new(0),
            next_subscription: Cell::new(0),
            series: Rc::new(RefCell::new(HashMap::new())),
            range_subscriptions: RefCell::new(HashMap::new()),
            crosshair_subscriptions: RefCell::new(HashMap::new()),
            resize_observers: RefCell::new(HashMap::new()),
            _tick_formatter: tick_formatter,
        }))
    }
}

type RetainedCallback = Closure<dyn Fn(JsValue)>;

pub struct LightweightChart {
    chart: JsValue,
    container: HtmlDivElement,
    mode: SeriesMode,
    next_series: Cell<u32>,
    next_subscription: Cell<u64>,
    series: Rc<RefCell<HashMap<SeriesId, JsValue>>>,
    range_subscriptions: RefCell<HashMap<SubscriptionId, RetainedCallback>>,
    crosshair_subscriptions: RefCell<HashMap<SubscriptionId, RetainedCallback>>,
    resize_observers: RefCell<HashMap<SubscriptionId, (ResizeObserver, RetainedCallback)>>,
    _tick_formatter: Closure<dyn Fn(JsValue) -> JsValue>,
}

impl LightweightChart {
    fn time_scale(&self) -> Option<JsValue> {
        call0(&self.chart, "timeScale").ok().filter(|value| value.is_object())
    }

    fn register_series(&self, series: JsValue) -> SeriesId {
        let id = SeriesId(self.next_series.get());
        self.next_series.set(id.0 + 1);
        self.series.borrow_mut().insert(id, series);
        id
    }

    fn next_subscription_id(&self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get() + 1);
        self.next_subscription.set(id.0);
        id
    }

    fn create_series(&self, definition_key: &str, method_name: &str, options: &JsValue) -> Option<SeriesId> {
        let series = match &self.mode {
            SeriesMode::Methods => call1(&self.chart, method_name, options).ok()?,
            SeriesMode::Definitions { candlestick, line } => {
                let definition = match definition_key {
                    "line" => line,
                    _ => candlestick,
                };
                call2(&self.chart, "addSeries", definition, options).ok()?
            }
        };
        if !series.is_object() {
            return None;
        }
        Some(self.register_series(series))
    }

    fn candle_options(options: &CandleSeriesOptions) -> JsValue {
        let obj = Object::new();
        set(&obj, "upColor", &JsValue::from_str(options.up_color));
        set(&obj, "downColor", &JsValue::from_str(options.down_color));
        set(&obj, "borderVisible", &JsValue::TRUE);
        set(&obj, "borderUpColor", &JsValue::from_str(options.up_color));
        set(&obj, "borderDownColor", &JsValue::from_str(options.down_color));
        set(&obj, "wickUpColor", &JsValue::from_str(options.up_color));
        set(&obj, "wickDownColor", &JsValue::from_str(options.down_color));
        obj.into()
    }

}

impl ChartApi for LightweightChart {
    fn add_candlestick_series(&self, options: &CandleSeriesOptions) -> Option<SeriesId> {
        self.create_series("candlestick", "addCandlestickSeries", &Self::candle_options(options))
    }

    fn add_volume_series(&self, options: &CandleSeriesOptions) -> Option<SeriesId> {
        // Volume shares the candle series type, anchored to its own price
        // scale at the bottom margin of the chart.
        let obj = Object::new();
        set(&obj, "upColor", &JsValue::from_str(options.up_color));
        set(&obj, "downColor", &JsValue::from_str(options.down_color));
        set(&obj, "priceScaleId", &JsValue::from_str("volume"));
        let price_format = Object::new();
        set(&price_format, "type", &JsValue::from_str("volume"));
        set(&obj, "priceFormat", &price_format);
        set(&obj, "wickVisible", &JsValue::FALSE);
        set(&obj, "borderVisible", &JsValue::FALSE);

        let id = self.create_series("candlestick", "addCandlestickSeries", &obj.into())?;

        if let Ok(scale) = call1(&self.chart, "priceScale", &JsValue::from_str("volume")) {
            let options = Object::new();
            let margins = Object::new();
            set(&margins, "top", &JsValue::from_f64(0.72));
            set(&margins, "bottom", &JsValue::from_f64(0.0));
            set(&options, "scaleMargins", &margins);
            let _ = call1(&scale, "applyOptions", &options);
        }
        Some(id)
    }

    fn add_line_series(&self, options: &LineSeriesOptions) -> Option<SeriesId> {
        let obj = Object::new();
        set(&obj, "color", &JsValue::from_str(options.color));
        set(&obj, "lineWidth", &JsValue::from_f64(options.line_width));
        set(&obj, "priceLineVisible", &JsValue::FALSE);
        set(&obj, "lastValueVisible", &JsValue::FALSE);
        if options.on_volume_scale {
            set(&obj, "priceScaleId", &JsValue::from_str("volume"));
        }
        self.create_series("line", "addLineSeries", &obj.into())
    }

    fn set_candle_data(&self, series: SeriesId, data: &[CandlePoint]) {
        let Some(series) = self.series.borrow().get(&series).cloned() else { return };
        let array = Array::new();
        for point in data {
            let obj = Object::new();
            set(&obj, "time", &business_date_to_js(point.time));
            set(&obj, "open", &JsValue::from_f64(point.open));
            set(&obj, "high", &JsValue::from_f64(point.high));
            set(&obj, "low", &JsValue::from_f64(point.low));
            set(&obj, "close", &JsValue::from_f64(point.close));
            if let Some(color) = point.color {
                set(&obj, "color", &JsValue::from_str(color));
                set(&obj, "borderColor", &JsValue::from_str(color));
                set(&obj, "wickColor", &JsValue::from_str(color));
            }
            array.push(&obj);
        }
        if let Err(err) = call1(&series, "setData", &array) {
            get_logger().error(
                LogComponent::Infrastructure("Charting"),
                &format!("setData failed: {:?}", err),
            );
        }
    }

    fn set_line_data(&self, series: SeriesId, data: &[MaPoint]) {
        let Some(series) = self.series.borrow().get(&series).cloned() else { return };
        let array = Array::new();
        for point in data {
            let obj = Object::new();
            set(&obj, "time", &business_date_to_js(point.time));
            set(&obj, "value", &JsValue::from_f64(point.value));
            array.push(&obj);
        }
        if let Err(err) = call1(&series, "setData", &array) {
            get_logger().error(
                LogComponent::Infrastructure("Charting"),
                &format!("setData failed: {:?}", err),
            );
        }
    }

    fn apply_dimensions(&self, width: u32, height: u32) {
        let options = Object::new();
        set(&options, "width", &JsValue::from_f64(width as f64));
        set(&options, "height", &JsValue::from_f64(height as f64));
        let _ = call1(&self.chart, "applyOptions", &options);
    }

    fn fit_content(&self) {
        if let Some(scale) = self.time_scale() {
            let _ = call0(&scale, "fitContent");
        }
    }

    fn container_size(&self) -> (u32, u32) {
        (self.container.client_width().max(0) as u32, self.container.client_height().max(0) as u32)
    }

    fn supports_range_events(&self) -> bool {
        self.time_scale()
            .map(|scale| {
                method(&scale, "subscribeVisibleLogicalRangeChange").is_some()
                    && method(&scale, "setVisibleLogicalRange").is_some()
            })
            .unwrap_or(false)
    }

    fn supports_crosshair_events(&self) -> bool {
        method(&self.chart, "subscribeCrosshairMove").is_some()
            && method(&self.chart, "setCrosshairPosition").is_some()
    }

    fn visible_range(&self) -> Option<LogicalRange> {
        let scale = self.time_scale()?;
        logical_range_from_js(&call0(&scale, "getVisibleLogicalRange").ok()?)
    }

    fn set_visible_range(&self, range: LogicalRange) -> RenderingResult<()> {
        let scale = self
            .time_scale()
            .ok_or_else(|| DashboardError::RenderingError("time scale unavailable".to_string()))?;
        let obj = Object::new();
        set(&obj, "from", &JsValue::from_f64(range.from));
        set(&obj, "to", &JsValue::from_f64(range.to));
        call1(&scale, "setVisibleLogicalRange", &obj)
            .map(|_| ())
            .map_err(|err| rendering_error("setVisibleLogicalRange", err))
    }

    fn subscribe_visible_range(&self, handler: RangeHandler) -> SubscriptionId {
        let id = self.next_subscription_id();
        let callback = Closure::<dyn Fn(JsValue)>::new(move |raw: JsValue| {
            handler(logical_range_from_js(&raw));
        });
        if let Some(scale) = self.time_scale() {
            let _ = call1(
                &scale,
                "subscribeVisibleLogicalRangeChange",
                callback.as_ref().unchecked_ref(),
            );
        }
        self.range_subscriptions.borrow_mut().insert(id, callback);
        id
    }

    fn unsubscribe_visible_range(&self, id: SubscriptionId) {
        if let Some(callback) = self.range_subscriptions.borrow_mut().remove(&id) {
            if let Some(scale) = self.time_scale() {
                let _ = call1(
                    &scale,
                    "unsubscribeVisibleLogicalRangeChange",
                    callback.as_ref().unchecked_ref(),
                );
            }
        }
    }

    fn subscribe_crosshair(&self, handler: CrosshairHandler) -> SubscriptionId {
        let id = self.next_subscription_id();
        let series = Rc::clone(&self.series);
        let callback = Closure::<dyn Fn(JsValue)>::new(move |raw: JsValue| {
            let param = crosshair_param(&series.borrow(), &raw);
            handler(&param);
        });
        let _ = call1(&self.chart, "subscribeCrosshairMove", callback.as_ref().unchecked_ref());
        self.crosshair_subscriptions.borrow_mut().insert(id, callback);
        id
    }

    fn unsubscribe_crosshair(&self, id: SubscriptionId) {
        if let Some(callback) = self.crosshair_subscriptions.borrow_mut().remove(&id) {
            let _ =
                call1(&self.chart, "unsubscribeCrosshairMove", callback.as_ref().unchecked_ref());
        }
    }

    fn set_crosshair(
        &self,
        series: SeriesId,
        price: f64,
        time: BusinessDate,
    ) -> RenderingResult<()> {
        let series = self
            .series
            .borrow()
            .get(&series)
            .cloned()
            .ok_or_else(|| DashboardError::RenderingError("unknown series".to_string()))?;
        call3(
            &self.chart,
            "setCrosshairPosition",
            &JsValue::from_f64(price),
            &business_date_to_js(time),
            &series,
        )
        .map(|_| ())
        .map_err(|err| rendering_error("setCrosshairPosition", err))
    }

    fn clear_crosshair(&self) -> RenderingResult<()> {
        call0(&self.chart, "clearCrosshairPosition")
            .map(|_| ())
            .map_err(|err| rendering_error("clearCrosshairPosition", err))
    }

    fn observe_resize(&self, handler: ResizeHandler) -> Option<SubscriptionId> {
        let container = self.container.clone();
        let callback = Closure::<dyn Fn(JsValue)>::new(move |_entries: JsValue| {
            let width = container.client_width().max(0) as u32;
            let height = container.client_height().max(0) as u32;
            handler(width, height);
        });
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref()).ok()?;
        observer.observe(&self.container);

        let id = self.next_subscription_id();
        self.resize_observers.borrow_mut().insert(id, (observer, callback));
        Some(id)
    }

    fn unobserve_resize(&self, id: SubscriptionId) {
        if let Some((observer, _callback)) = self.resize_observers.borrow_mut().remove(&id) {
            observer.disconnect();
        }
    }

    fn create_tooltip(&self) -> Option<Box<dyn TooltipApi>> {
        let document = web_sys::window()?.document()?;
        let element = document.create_element("div").ok()?;
        element.set_class_name("lw-tooltip");
        let _ = element.set_attribute("style", &format!("{}display:none;", TOOLTIP_BASE_STYLE));
        self.container.append_child(&element).ok()?;
        Some(Box::new(LightweightTooltip { element }))
    }

    fn remove(&self) {
        if let Err(err) = call0(&self.chart, "remove") {
            get_logger().error(
                LogComponent::Infrastructure("Charting"),
                &format!("chart.remove failed: {:?}", err),
            );
        }
        self.range_subscriptions.borrow_mut().clear();
        self.crosshair_subscriptions.borrow_mut().clear();
        for (_, (observer, _)) in self.resize_observers.borrow_mut().drain() {
            observer.disconnect();
        }
    }
}

/// Rebuild a typed crosshair param from the raw library event, resolving
/// per-series data through the adapter's series handles.
fn crosshair_param(series: &HashMap<SeriesId, JsValue>, raw: &JsValue) -> CrosshairMove {
    let time = business_date_from_js(&get(raw, "time"));
    let point_js = get(raw, "point");
    let point = if point_js.is_object() {
        match (get(&point_js, "x").as_f64(), get(&point_js, "y").as_f64()) {
            (Some(x), Some(y)) => Some(ChartPoint { x, y }),
            _ => None,
        }
    } else {
        None
    };

    let mut samples = Vec::new();
    let series_data = get(raw, "seriesData");
    if let Some(map) = series_data.dyn_ref::<js_sys::Map>() {
        for (id, handle) in series.iter() {
            let datum = map.get(handle);
            if !datum.is_object() {
                continue;
            }
            if let Some(open) = get(&datum, "open").as_f64() {
                samples.push((
                    *id,
                    SeriesSample::Candle {
                        open,
                        high: get(&datum, "high").as_f64().unwrap_or(open),
                        low: get(&datum, "low").as_f64().unwrap_or(open),
                        close: get(&datum, "close").as_f64().unwrap_or(open),
                    },
                ));
            } else if let Some(value) = get(&datum, "value").as_f64() {
                samples.push((*id, SeriesSample::Line { value }));
            }
        }
    }

    CrosshairMove { time, point, samples }
}

struct LightweightTooltip {
    element: Element,
}

impl LightweightTooltip {
    fn apply_style(&self, extra: &str) {
        let _ = self.element.set_attribute("style", &format!("{}{}", TOOLTIP_BASE_STYLE, extra));
    }
}

impl TooltipApi for LightweightTooltip {
    fn set_lines(&self, lines: &[String]) {
        self.element.set_text_content(Some(&lines.join("\n")));
    }

    fn show_at(&self, left: f64, top: f64) {
        self.apply_style(&format!("left:{}px;top:{}px;display:block;", left, top));
    }

    fn hide(&self) {
        self.apply_style("display:none;");
    }

    fn remove(&self) {
        self.element.remove();
    }
}
