#![allow(dead_code)]

use futures::channel::oneshot;
use krx_dashboard_wasm::application::dashboard::{Dashboard, initialize_dashboard};
use krx_dashboard_wasm::domain::errors::NetworkResult;
use krx_dashboard_wasm::domain::market_data::RawOhlcvRecord;
use krx_dashboard_wasm::domain::repositories::{
    BenchmarkIndex, BenchmarkQuery, BenchmarkSeriesOption, DashboardGateway, InstrumentOption,
    OhlcvPage, PriceQuery,
};
use krx_dashboard_wasm::infrastructure::charting::RecordingBackend;
use krx_dashboard_wasm::infrastructure::storage::InMemorySettings;
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

pub fn raw_row(date: &str, open: f64, high: f64, low: f64, close: f64, volume: f64) -> RawOhlcvRecord {
    RawOhlcvRecord {
        trade_date: date.to_string(),
        open: json!(open),
        high: json!(high),
        low: json!(low),
        close: json!(close),
        volume: json!(volume),
    }
}

pub fn page(items: Vec<RawOhlcvRecord>) -> OhlcvPage {
    let total = Some(items.len() as u64);
    OhlcvPage { items, total }
}

pub fn instrument(code: &str, market: &str) -> InstrumentOption {
    InstrumentOption {
        external_code: code.to_string(),
        instrument_name: Some(format!("Instrument {}", code)),
        market_code: Some(market.to_string()),
    }
}

/// Programmable in-memory gateway. Price responses can be switched to
/// manual resolution so tests control network completion order.
#[derive(Default)]
pub struct StubGateway {
    pub benchmarks: RefCell<Vec<BenchmarkIndex>>,
    pub series_options: RefCell<Vec<BenchmarkSeriesOption>>,
    pub price_pages: RefCell<VecDeque<OhlcvPage>>,
    pub bench_pages: RefCell<VecDeque<OhlcvPage>>,
    pub manual_prices: Cell<bool>,
    pub pending_prices: RefCell<VecDeque<oneshot::Sender<OhlcvPage>>>,
    pub price_fetches: Cell<usize>,
}

impl StubGateway {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Resolve the oldest in-flight manual price request.
    pub fn resolve_oldest_price(&self, page: OhlcvPage) {
        let sender = self
            .pending_prices
            .borrow_mut()
            .pop_front()
            .expect("no pending price request");
        let _ = sender.send(page);
    }

    /// Resolve the newest in-flight manual price request.
    pub fn resolve_newest_price(&self, page: OhlcvPage) {
        let sender = self
            .pending_prices
            .borrow_mut()
            .pop_back()
            .expect("no pending price request");
        let _ = sender.send(page);
    }
}

impl DashboardGateway for StubGateway {
    async fn fetch_summary(&self) -> NetworkResult<Value> {
        Ok(json!({"instrument_count": 1}))
    }

    async fn fetch_runs(&self, _limit: u32) -> NetworkResult<Vec<Value>> {
        Ok(Vec::new())
    }

    async fn fetch_instrument_options(
        &self,
        _query: &str,
        _limit: u32,
    ) -> NetworkResult<Vec<InstrumentOption>> {
        Ok(Vec::new())
    }

    async fn fetch_instrument_profile(&self, _external_code: &str) -> NetworkResult<Value> {
        Ok(Value::Null)
    }

    async fn fetch_prices(&self, _query: &PriceQuery) -> NetworkResult<OhlcvPage> {
        self.price_fetches.set(self.price_fetches.get() + 1);
        if self.manual_prices.get() {
            let (sender, receiver) = oneshot::channel();
            self.pending_prices.borrow_mut().push_back(sender);
            return Ok(receiver.await.unwrap_or_default());
        }
        Ok(self.price_pages.borrow_mut().pop_front().unwrap_or_default())
    }

    async fn fetch_benchmarks(&self) -> NetworkResult<Vec<BenchmarkIndex>> {
        Ok(self.benchmarks.borrow().clone())
    }

    async fn fetch_benchmark_series_options(
        &self,
        _index_code: &str,
    ) -> NetworkResult<Vec<BenchmarkSeriesOption>> {
        Ok(self.series_options.borrow().clone())
    }

    async fn fetch_benchmark_rows(&self, _query: &BenchmarkQuery) -> NetworkResult<OhlcvPage> {
        Ok(self.bench_pages.borrow_mut().pop_front().unwrap_or_default())
    }

    async fn fetch_quality_issues(
        &self,
        _limit: u32,
        _severity: &str,
    ) -> NetworkResult<Vec<Value>> {
        Ok(Vec::new())
    }
}

/// Install a fresh dashboard in this test thread's slot and hand back its
/// collaborators.
pub fn install_dashboard() -> (Rc<RecordingBackend>, Rc<InMemorySettings>) {
    let backend = Rc::new(RecordingBackend::new());
    let settings = Rc::new(InMemorySettings::new());
    initialize_dashboard(Dashboard::new(backend.clone(), settings.clone()));
    (backend, settings)
}
