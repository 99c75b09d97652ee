//! Dashboard orchestrator: one explicit state struct with well-defined
//! mutation entry points, owning the chart context slots, the sync bridge
//! and the per-stream request sequences.
//!
//! Core components stay pure or locally-stateful; everything that mutates
//! dashboard state goes through here. The instance lives in a thread-local
//! slot and is only borrowed transiently - loaders re-enter it after their
//! await completes, never across a suspension point.

use crate::application::chart_context::{ChartContext, dispose_slot};
use crate::application::sync_bridge::ChartSyncBridge;
use crate::domain::chart::ChartingBackend;
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{
    CandleRowSet, MA_SETTINGS_KEY, PeriodSet, RawOhlcvRecord, build_candle_rows,
    decode_ma_settings, encode_ma_settings,
};
use crate::domain::repositories::{
    BenchmarkIndex, BenchmarkQuery, BenchmarkSeriesOption, DashboardGateway, InstrumentOption,
    PriceQuery, SettingsGateway,
};
use crate::domain::sequencing::RequestSequence;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use strum::{AsRefStr, EnumIter, EnumString};

pub const PRICE_CHART_CONTAINER: &str = "priceChart";
pub const INSTRUMENT_BENCH_CHART_CONTAINER: &str = "instrumentBenchChart";
pub const BENCH_CHART_CONTAINER: &str = "benchChart";

pub const RUNS_LIMIT: u32 = 20;
pub const OPTIONS_LIMIT: u32 = 20;
pub const QUALITY_LIMIT: u32 = 50;
pub const DEFAULT_BENCH_LIMIT: u32 = 1000;

const NO_VALID_OHLC_MESSAGE: &str = "No valid OHLC rows to draw a candlestick chart.";
const RENDER_UNAVAILABLE_MESSAGE: &str =
    "Chart rendering is unavailable; the table below still shows the data.";
const NO_BENCH_SERIES_MESSAGE: &str = "No benchmark series found for the selected market.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, AsRefStr)]
pub enum DashboardTab {
    #[strum(serialize = "overview")]
    Overview,
    #[strum(serialize = "instruments")]
    Instruments,
    #[strum(serialize = "quality")]
    Quality,
}

impl DashboardTab {
    pub fn label(&self) -> &'static str {
        match self {
            DashboardTab::Overview => "Overview",
            DashboardTab::Instruments => "Instruments",
            DashboardTab::Quality => "Quality",
        }
    }
}

pub struct Dashboard {
    pub active_tab: DashboardTab,
    pub last_refresh: String,

    pub summary: Value,
    pub runs: Vec<Value>,
    pub runs_loading: bool,

    pub instrument_query: String,
    pub instrument_options: Vec<InstrumentOption>,
    pub selected_instrument: Option<InstrumentOption>,
    pub instrument_profile: Value,
    pub option_loading: bool,

    pub prices: Vec<RawOhlcvRecord>,
    pub price_from: String,
    pub price_to: String,
    pub price_loading: bool,
    pub price_queried: bool,
    pub price_chart_error: String,
    pub price_chart: Option<ChartContext>,
    pub price_seq: RequestSequence,

    pub show_instrument_bench: bool,
    pub instrument_bench_series: Vec<RawOhlcvRecord>,
    pub instrument_bench_loading: bool,
    pub instrument_bench_queried: bool,
    pub instrument_bench_error: String,
    pub instrument_bench_index_code: String,
    pub instrument_bench_series_name: String,
    pub instrument_bench_series_options: Vec<BenchmarkSeriesOption>,
    pub instrument_bench_chart: Option<ChartContext>,
    pub instrument_bench_seq: RequestSequence,
    pub sync_bridge: ChartSyncBridge,

    pub benchmarks: Vec<BenchmarkIndex>,
    pub bench_series_options: Vec<BenchmarkSeriesOption>,
    pub bench_series: Vec<RawOhlcvRecord>,
    pub selected_index: String,
    pub selected_series: String,
    pub bench_from: String,
    pub bench_to: String,
    pub bench_loading: bool,
    pub bench_total: u64,
    pub bench_limit: u32,
    pub bench_offset: u32,
    pub bench_chart_error: String,
    pub bench_chart: Option<ChartContext>,
    pub bench_seq: RequestSequence,

    pub price_ma: PeriodSet,
    pub volume_ma: PeriodSet,
    pub ma_settings_error: String,

    pub quality_issues: Vec<Value>,
    pub quality_severity: String,
    pub quality_loading: bool,

    backend: Rc<dyn ChartingBackend>,
    settings: Rc<dyn SettingsGateway>,
}

impl Dashboard {
    pub fn new(backend: Rc<dyn ChartingBackend>, settings: Rc<dyn SettingsGateway>) -> Self {
        let (price_ma, volume_ma) = decode_ma_settings(settings.load(MA_SETTINGS_KEY).as_deref());
        Self {
            active_tab: DashboardTab::Overview,
            last_refresh: "-".to_string(),
            summary: Value::Null,
            runs: Vec::new(),
            runs_loading: false,
            instrument_query: String::new(),
            instrument_options: Vec::new(),
            selected_instrument: None,
            instrument_profile: Value::Null,
            option_loading: false,
            prices: Vec::new(),
            price_from: String::new(),
            price_to: String::new(),
            price_loading: false,
            price_queried: false,
            price_chart_error: String::new(),
            price_chart: None,
            price_seq: RequestSequence::new(),
            show_instrument_bench: false,
            instrument_bench_series: Vec::new(),
            instrument_bench_loading: false,
            instrument_bench_queried: false,
            instrument_bench_error: String::new(),
            instrument_bench_index_code: String::new(),
            instrument_bench_series_name: String::new(),
            instrument_bench_series_options: Vec::new(),
            instrument_bench_chart: None,
            instrument_bench_seq: RequestSequence::new(),
            sync_bridge: ChartSyncBridge::new(),
            benchmarks: Vec::new(),
            bench_series_options: Vec::new(),
            bench_series: Vec::new(),
            selected_index: String::new(),
            selected_series: String::new(),
            bench_from: String::new(),
            bench_to: String::new(),
            bench_loading: false,
            bench_total: 0,
            bench_limit: DEFAULT_BENCH_LIMIT,
            bench_offset: 0,
            bench_chart_error: String::new(),
            bench_chart: None,
            bench_seq: RequestSequence::new(),
            price_ma,
            volume_ma,
            ma_settings_error: String::new(),
            quality_issues: Vec::new(),
            quality_severity: String::new(),
            quality_loading: false,
            backend,
            settings,
        }
    }

    // ----- MA settings -------------------------------------------------

    fn persist_ma_settings(&self) {
        self.settings.save(MA_SETTINGS_KEY, &encode_ma_settings(&self.price_ma, &self.volume_ma));
    }

    fn add_ma_period(&mut self, volume: bool, input: &str) -> bool {
        let parsed = input.trim().parse::<i64>().ok();
        let target = if volume { &mut self.volume_ma } else { &mut self.price_ma };
        match target.add(parsed) {
            Ok(period) => {
                self.ma_settings_error.clear();
                self.persist_ma_settings();
                self.refresh_all_charts();
                get_logger().info(
                    LogComponent::Application("Dashboard"),
                    &format!("added MA period {}", period),
                );
                true
            }
            Err(err) => {
                self.ma_settings_error = err.to_string();
                false
            }
        }
    }

    fn remove_ma_period(&mut self, volume: bool, period: u32) {
        let target = if volume { &mut self.volume_ma } else { &mut self.price_ma };
        if !target.remove(period) {
            return;
        }
        self.ma_settings_error.clear();
        self.persist_ma_settings();
        self.refresh_all_charts();
    }

    pub fn add_price_ma(&mut self, input: &str) -> bool {
        self.add_ma_period(false, input)
    }

    pub fn add_volume_ma(&mut self, input: &str) -> bool {
        self.add_ma_period(true, input)
    }

    pub fn remove_price_ma(&mut self, period: u32) {
        self.remove_ma_period(false, period);
    }

    pub fn remove_volume_ma(&mut self, period: u32) {
        self.remove_ma_period(true, period);
    }

    // ----- chart rendering ---------------------------------------------

    /// Re-render every chart that currently has data (after an MA settings
    /// change).
    pub fn refresh_all_charts(&mut self) {
        if !self.prices.is_empty() {
            self.render_price_chart();
        }
        if !self.bench_series.is_empty() {
            self.render_bench_chart();
        }
        if self.show_instrument_bench && !self.instrument_bench_series.is_empty() {
            self.render_instrument_bench_chart();
        }
    }

    pub fn render_price_chart(&mut self) {
        self.sync_bridge.unwire();
        dispose_slot(&mut self.price_chart);
        self.price_chart_error.clear();
        if self.prices.is_empty() {
            return;
        }

        let Some(mut context) = ChartContext::create(self.backend.as_ref(), PRICE_CHART_CONTAINER)
        else {
            self.price_chart_error = RENDER_UNAVAILABLE_MESSAGE.to_string();
            get_logger().warn(
                LogComponent::Application("Dashboard"),
                "price chart context unavailable",
            );
            return;
        };
        let rows = build_candle_rows(&self.prices);
        if rows.is_empty() {
            context.dispose();
            self.price_chart_error = NO_VALID_OHLC_MESSAGE.to_string();
            return;
        }
        context.render(CandleRowSet::new(rows), self.price_ma.periods(), self.volume_ma.periods());
        self.price_chart = Some(context);
        self.rewire_instrument_chart_sync_if_ready();
    }

    /// The overlay chart carries no MA lines of its own; its job is to stay
    /// readable alongside the instrument chart.
    pub fn render_instrument_bench_chart(&mut self) {
        self.sync_bridge.unwire();
        dispose_slot(&mut self.instrument_bench_chart);
        if !self.show_instrument_bench || self.instrument_bench_series.is_empty() {
            return;
        }
        self.instrument_bench_error.clear();

        let Some(mut context) =
            ChartContext::create(self.backend.as_ref(), INSTRUMENT_BENCH_CHART_CONTAINER)
        else {
            self.instrument_bench_error = RENDER_UNAVAILABLE_MESSAGE.to_string();
            return;
        };
        let rows = build_candle_rows(&self.instrument_bench_series);
        if rows.is_empty() {
            context.dispose();
            self.instrument_bench_error = NO_VALID_OHLC_MESSAGE.to_string();
            return;
        }
        context.render(CandleRowSet::new(rows), &[], &[]);
        self.instrument_bench_chart = Some(context);
        self.rewire_instrument_chart_sync_if_ready();
    }

    pub fn render_bench_chart(&mut self) {
        dispose_slot(&mut self.bench_chart);
        self.bench_chart_error.clear();
        if self.bench_series.is_empty() {
            return;
        }

        let Some(mut context) = ChartContext::create(self.backend.as_ref(), BENCH_CHART_CONTAINER)
        else {
            self.bench_chart_error = RENDER_UNAVAILABLE_MESSAGE.to_string();
            return;
        };
        let rows = build_candle_rows(&self.bench_series);
        if rows.is_empty() {
            context.dispose();
            self.bench_chart_error = NO_VALID_OHLC_MESSAGE.to_string();
            return;
        }
        context.render(CandleRowSet::new(rows), self.price_ma.periods(), self.volume_ma.periods());
        self.bench_chart = Some(context);
    }

    fn rewire_instrument_chart_sync_if_ready(&mut self) {
        self.sync_bridge.unwire();
        if !self.show_instrument_bench {
            return;
        }
        let (Some(price), Some(bench)) = (&self.price_chart, &self.instrument_bench_chart) else {
            return;
        };
        self.sync_bridge.wire(price, bench);
    }

    pub fn resize_charts(&self) {
        if let Some(context) = &self.price_chart {
            context.resize_to_container();
        }
        if let Some(context) = &self.bench_chart {
            context.resize_to_container();
        }
        if let Some(context) = &self.instrument_bench_chart {
            context.resize_to_container();
        }
    }

    // ----- instrument selection and benchmark overlay -------------------

    /// Switch the selection; data loads are triggered by the caller.
    pub fn select_instrument(&mut self, option: InstrumentOption) {
        self.selected_instrument = Some(option);
        self.instrument_profile = Value::Null;
        self.prices = Vec::new();
        self.price_queried = false;
        self.sync_bridge.unwire();
        dispose_slot(&mut self.price_chart);
        self.reset_instrument_benchmark();
    }

    /// Turn the overlay stream off: supersede in-flight loads, drop the
    /// sync wiring and the chart, clear every overlay field.
    pub fn reset_instrument_benchmark(&mut self) {
        self.instrument_bench_seq.invalidate();
        self.sync_bridge.unwire();
        self.instrument_bench_series = Vec::new();
        self.instrument_bench_loading = false;
        self.instrument_bench_queried = false;
        self.instrument_bench_error.clear();
        self.instrument_bench_index_code.clear();
        self.instrument_bench_series_name.clear();
        self.instrument_bench_series_options = Vec::new();
        dispose_slot(&mut self.instrument_bench_chart);
    }

    pub fn market_code(&self) -> String {
        self.instrument_profile
            .get("market_code")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                self.selected_instrument.as_ref().and_then(|opt| opt.market_code.clone())
            })
            .unwrap_or_default()
    }

    pub fn benchmark_index_choices(&self) -> Vec<String> {
        self.benchmarks
            .iter()
            .map(|row| row.index_code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect()
    }

    pub fn ensure_instrument_benchmark_index_default(&mut self) {
        let choices = self.benchmark_index_choices();
        let default_code = resolve_benchmark_index_code(&self.market_code());
        if choices.iter().any(|code| code == default_code) {
            self.instrument_bench_index_code = default_code.to_string();
            return;
        }
        self.instrument_bench_index_code =
            choices.into_iter().next().unwrap_or_else(|| default_code.to_string());
    }
}

/// Map an instrument's market code to the benchmark index family shown
/// beside it.
pub fn resolve_benchmark_index_code(market_code: &str) -> &'static str {
    match market_code.trim().to_uppercase().as_str() {
        "KOSPI" => "KOSPI",
        "KOSDAQ" => "KOSDAQ",
        // KONEX instruments have no dedicated index; the broad market one
        // is the closest fit.
        _ => "KRX",
    }
}

/// Default series inside the chosen index family, by market.
pub fn resolve_benchmark_default_series_name(market_code: &str) -> &'static str {
    match market_code.trim().to_uppercase().as_str() {
        "KOSDAQ" => "코스닥 150",
        "KOSPI" => "코스피 200",
        _ => "",
    }
}

// ----- the owning slot ---------------------------------------------------

thread_local! {
    static DASHBOARD: RefCell<Option<Dashboard>> = const { RefCell::new(None) };
    static CHANGE_NOTIFIER: RefCell<Option<Box<dyn Fn()>>> = const { RefCell::new(None) };
}

/// Install the orchestrator instance (once, at startup).
pub fn initialize_dashboard(dashboard: Dashboard) {
    DASHBOARD.with(|slot| {
        *slot.borrow_mut() = Some(dashboard);
    });
}

/// Hook invoked after every mutation entry point; the presentation layer
/// registers its re-render trigger here.
pub fn set_change_notifier(notifier: impl Fn() + 'static) {
    CHANGE_NOTIFIER.with(|slot| {
        *slot.borrow_mut() = Some(Box::new(notifier));
    });
}

fn notify_changed() {
    CHANGE_NOTIFIER.with(|slot| {
        if let Some(notifier) = slot.borrow().as_ref() {
            notifier();
        }
    });
}

pub fn with_dashboard<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&Dashboard) -> R,
{
    DASHBOARD.with(|slot| slot.borrow().as_ref().map(f))
}

pub fn with_dashboard_mut<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut Dashboard) -> R,
{
    let result = DASHBOARD.with(|slot| slot.borrow_mut().as_mut().map(f));
    if result.is_some() {
        notify_changed();
    }
    result
}

// ----- async loaders ------------------------------------------------------
//
// Each loader follows the same shape: stamp a ticket and flip the busy flag
// inside one transient borrow, suspend on the gateway, then re-enter the
// state and apply the response only if the ticket is still current. A stale
// response returns before touching anything, busy flag included.

pub async fn load_summary<G: DashboardGateway>(gateway: &G) {
    let summary = gateway.fetch_summary().await.unwrap_or_default();
    with_dashboard_mut(|d| d.summary = summary);
}

pub async fn load_runs<G: DashboardGateway>(gateway: &G) {
    with_dashboard_mut(|d| d.runs_loading = true);
    let runs = gateway.fetch_runs(RUNS_LIMIT).await.unwrap_or_default();
    with_dashboard_mut(|d| {
        d.runs = runs;
        d.runs_loading = false;
    });
}

pub async fn load_benchmarks<G: DashboardGateway>(gateway: &G) {
    let benchmarks = gateway.fetch_benchmarks().await.unwrap_or_default();
    with_dashboard_mut(|d| d.benchmarks = benchmarks);
}

pub async fn load_quality_issues<G: DashboardGateway>(gateway: &G) {
    let Some(severity) = with_dashboard_mut(|d| {
        d.quality_loading = true;
        d.quality_severity.clone()
    }) else {
        return;
    };
    let issues = gateway.fetch_quality_issues(QUALITY_LIMIT, &severity).await.unwrap_or_default();
    with_dashboard_mut(|d| {
        d.quality_issues = issues;
        d.quality_loading = false;
    });
}

pub async fn search_instrument_options<G: DashboardGateway>(gateway: &G) {
    let Some(query) = with_dashboard_mut(|d| {
        d.option_loading = true;
        d.instrument_query.clone()
    }) else {
        return;
    };
    let options =
        gateway.fetch_instrument_options(&query, OPTIONS_LIMIT).await.unwrap_or_default();
    let auto_select = with_dashboard_mut(|d| {
        d.instrument_options = options;
        d.option_loading = false;
        match (&d.selected_instrument, d.instrument_options.first()) {
            (None, Some(first)) => Some(first.clone()),
            _ => None,
        }
    })
    .flatten();
    if let Some(option) = auto_select {
        select_instrument(gateway, option).await;
    }
}

pub async fn select_instrument<G: DashboardGateway>(gateway: &G, option: InstrumentOption) {
    with_dashboard_mut(|d| d.select_instrument(option));
    futures::join!(load_instrument_profile(gateway), load_prices(gateway));
}

pub async fn reload_selected_instrument<G: DashboardGateway>(gateway: &G) {
    let selected = with_dashboard(|d| d.selected_instrument.is_some()).unwrap_or(false);
    if !selected {
        return;
    }
    futures::join!(load_instrument_profile(gateway), load_prices(gateway));
}

pub async fn load_instrument_profile<G: DashboardGateway>(gateway: &G) {
    let Some(code) = with_dashboard(|d| {
        d.selected_instrument.as_ref().map(|opt| opt.external_code.clone())
    })
    .flatten() else {
        return;
    };
    let profile = gateway.fetch_instrument_profile(&code).await.unwrap_or_default();
    with_dashboard_mut(|d| d.instrument_profile = profile);
}

pub async fn load_prices<G: DashboardGateway>(gateway: &G) {
    let Some((query, ticket)) = with_dashboard_mut(|d| {
        let code = d.selected_instrument.as_ref().map(|opt| opt.external_code.clone())?;
        let ticket = d.price_seq.begin();
        d.price_loading = true;
        d.price_queried = true;
        Some((
            PriceQuery {
                external_code: code,
                date_from: d.price_from.clone(),
                date_to: d.price_to.clone(),
            },
            ticket,
        ))
    })
    .flatten() else {
        return;
    };

    let page = gateway.fetch_prices(&query).await.unwrap_or_default();

    let applied = with_dashboard_mut(|d| {
        if !d.price_seq.is_current(ticket) {
            get_logger().debug(
                LogComponent::Application("Dashboard"),
                "discarding stale price response",
            );
            return false;
        }
        let mut items = page.items;
        // The feed returns newest-first; the builder expects ascending time.
        items.reverse();
        d.prices = items;
        d.price_loading = false;
        d.render_price_chart();
        true
    })
    .unwrap_or(false);

    if applied && with_dashboard(|d| d.show_instrument_bench).unwrap_or(false) {
        load_instrument_benchmark(gateway).await;
    }
}

pub async fn on_instrument_benchmark_toggle<G: DashboardGateway>(gateway: &G) {
    let show = with_dashboard_mut(|d| {
        if !d.show_instrument_bench {
            d.reset_instrument_benchmark();
            return false;
        }
        if d.instrument_bench_index_code.is_empty() {
            d.ensure_instrument_benchmark_index_default();
        }
        true
    })
    .unwrap_or(false);
    if show {
        load_instrument_benchmark(gateway).await;
    }
}

pub async fn on_instrument_benchmark_index_change<G: DashboardGateway>(gateway: &G) {
    let show = with_dashboard_mut(|d| {
        if !d.show_instrument_bench {
            return false;
        }
        d.instrument_bench_series_name.clear();
        d.instrument_bench_series_options = Vec::new();
        true
    })
    .unwrap_or(false);
    if show {
        load_instrument_benchmark(gateway).await;
    }
}

pub async fn on_instrument_benchmark_series_change<G: DashboardGateway>(gateway: &G) {
    if with_dashboard(|d| d.show_instrument_bench).unwrap_or(false) {
        load_instrument_benchmark(gateway).await;
    }
}

pub async fn load_instrument_benchmark<G: DashboardGateway>(gateway: &G) {
    let Some((ticket, index_code)) = with_dashboard_mut(|d| {
        if !d.show_instrument_bench || d.selected_instrument.is_none() {
            return None;
        }
        if d.instrument_bench_index_code.is_empty() {
            d.ensure_instrument_benchmark_index_default();
        }
        let ticket = d.instrument_bench_seq.begin();
        d.instrument_bench_loading = true;
        d.instrument_bench_queried = true;
        d.instrument_bench_error.clear();
        d.instrument_bench_series = Vec::new();
        d.sync_bridge.unwire();
        dispose_slot(&mut d.instrument_bench_chart);
        Some((ticket, d.instrument_bench_index_code.clone()))
    })
    .flatten() else {
        return;
    };

    let options =
        gateway.fetch_benchmark_series_options(&index_code).await.unwrap_or_default();

    let Some(query) = with_dashboard_mut(|d| {
        if !d.instrument_bench_seq.is_current(ticket) {
            return None;
        }
        d.instrument_bench_series_options = options;
        if d.instrument_bench_series_options.is_empty() {
            d.instrument_bench_loading = false;
            d.instrument_bench_error = NO_BENCH_SERIES_MESSAGE.to_string();
            return None;
        }
        let has_selected = d
            .instrument_bench_series_options
            .iter()
            .any(|row| row.index_name == d.instrument_bench_series_name);
        if !has_selected {
            let default_name = resolve_benchmark_default_series_name(&d.market_code());
            let exact = d
                .instrument_bench_series_options
                .iter()
                .find(|row| row.index_name.trim() == default_name)
                .map(|row| row.index_name.clone());
            d.instrument_bench_series_name = exact.unwrap_or_else(|| {
                d.instrument_bench_series_options[0].index_name.clone()
            });
        }
        Some(BenchmarkQuery {
            index_code: index_code.clone(),
            series_name: d.instrument_bench_series_name.clone(),
            date_from: d.price_from.clone(),
            date_to: d.price_to.clone(),
            limit: d.bench_limit,
            offset: 0,
        })
    })
    .flatten() else {
        return;
    };

    let page = gateway.fetch_benchmark_rows(&query).await.unwrap_or_default();

    with_dashboard_mut(|d| {
        if !d.instrument_bench_seq.is_current(ticket) {
            get_logger().debug(
                LogComponent::Application("Dashboard"),
                "discarding stale instrument benchmark response",
            );
            return;
        }
        let mut items = page.items;
        items.reverse();
        d.instrument_bench_series = items;
        d.instrument_bench_loading = false;
        d.render_instrument_bench_chart();
    });
}

pub async fn on_benchmark_index_change<G: DashboardGateway>(gateway: &G) {
    let Some(index_code) = with_dashboard_mut(|d| {
        d.selected_series.clear();
        d.bench_series = Vec::new();
        d.bench_series_options = Vec::new();
        d.bench_total = 0;
        d.bench_offset = 0;
        dispose_slot(&mut d.bench_chart);
        (!d.selected_index.is_empty()).then(|| d.selected_index.clone())
    })
    .flatten() else {
        return;
    };

    let options =
        gateway.fetch_benchmark_series_options(&index_code).await.unwrap_or_default();
    let load_first = with_dashboard_mut(|d| {
        d.bench_series_options = options;
        match d.bench_series_options.first() {
            Some(first) => {
                d.selected_series = first.index_name.clone();
                true
            }
            None => false,
        }
    })
    .unwrap_or(false);
    if load_first {
        load_benchmark_series(gateway).await;
    }
}

pub async fn load_benchmark_series<G: DashboardGateway>(gateway: &G) {
    let Some((query, ticket)) = with_dashboard_mut(|d| {
        if d.selected_index.is_empty() || d.selected_series.is_empty() {
            return None;
        }
        let ticket = d.bench_seq.begin();
        d.bench_loading = true;
        Some((
            BenchmarkQuery {
                index_code: d.selected_index.clone(),
                series_name: d.selected_series.clone(),
                date_from: d.bench_from.clone(),
                date_to: d.bench_to.clone(),
                limit: d.bench_limit,
                offset: d.bench_offset,
            },
            ticket,
        ))
    })
    .flatten() else {
        return;
    };

    let page = gateway.fetch_benchmark_rows(&query).await.unwrap_or_default();

    with_dashboard_mut(|d| {
        if !d.bench_seq.is_current(ticket) {
            return;
        }
        d.bench_total = page.total.unwrap_or(0);
        let mut items = page.items;
        items.reverse();
        d.bench_series = items;
        d.bench_loading = false;
        d.render_bench_chart();
    });
}
