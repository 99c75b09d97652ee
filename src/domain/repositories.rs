//! Ports implemented by infrastructure: the dashboard data source and the
//! settings store.

use crate::domain::errors::NetworkResult;
use crate::domain::market_data::RawOhlcvRecord;
use serde::Deserialize;
use serde_json::Value;

/// One selectable instrument, as returned by the options endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InstrumentOption {
    #[serde(default)]
    pub external_code: String,
    #[serde(default)]
    pub instrument_name: Option<String>,
    #[serde(default)]
    pub market_code: Option<String>,
}

/// One benchmark index family (KOSPI, KOSDAQ, ...).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BenchmarkIndex {
    #[serde(default)]
    pub index_code: String,
    #[serde(default)]
    pub series_count: Option<u64>,
}

/// One concrete series under a benchmark index.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BenchmarkSeriesOption {
    #[serde(default)]
    pub index_name: String,
}

/// `{items, total}` envelope used by the row endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OhlcvPage {
    #[serde(default)]
    pub items: Vec<RawOhlcvRecord>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Query for price rows of one instrument.
#[derive(Debug, Clone, Default)]
pub struct PriceQuery {
    pub external_code: String,
    pub date_from: String,
    pub date_to: String,
}

/// Query for benchmark rows of one index series.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkQuery {
    pub index_code: String,
    pub series_name: String,
    pub date_from: String,
    pub date_to: String,
    pub limit: u32,
    pub offset: u32,
}

/// Interface to the dashboard HTTP API.
///
/// Callers catch every error and treat it as an empty result; nothing from
/// the data source is allowed to propagate into the render pipeline.
#[allow(async_fn_in_trait)]
pub trait DashboardGateway {
    async fn fetch_summary(&self) -> NetworkResult<Value>;
    async fn fetch_runs(&self, limit: u32) -> NetworkResult<Vec<Value>>;
    async fn fetch_instrument_options(
        &self,
        query: &str,
        limit: u32,
    ) -> NetworkResult<Vec<InstrumentOption>>;
    async fn fetch_instrument_profile(&self, external_code: &str) -> NetworkResult<Value>;
    async fn fetch_prices(&self, query: &PriceQuery) -> NetworkResult<OhlcvPage>;
    async fn fetch_benchmarks(&self) -> NetworkResult<Vec<BenchmarkIndex>>;
    async fn fetch_benchmark_series_options(
        &self,
        index_code: &str,
    ) -> NetworkResult<Vec<BenchmarkSeriesOption>>;
    async fn fetch_benchmark_rows(&self, query: &BenchmarkQuery) -> NetworkResult<OhlcvPage>;
    async fn fetch_quality_issues(
        &self,
        limit: u32,
        severity: &str,
    ) -> NetworkResult<Vec<Value>>;
}

/// Interface to the persisted user settings store (a plain key/value blob).
pub trait SettingsGateway {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str);
}
