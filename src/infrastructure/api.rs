//! HTTP client for the collector's dashboard API.
//!
//! Thin request/response plumbing: named parameters with blank values are
//! omitted from the query string, responses decode straight into the domain
//! DTOs, and every failure surfaces as a NetworkError the loaders turn into
//! an empty result.

use crate::domain::errors::{DashboardError, NetworkResult};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::repositories::{
    BenchmarkIndex, BenchmarkQuery, BenchmarkSeriesOption, DashboardGateway, InstrumentOption,
    OhlcvPage, PriceQuery,
};
use gloo_net::http::Request;
use serde::de::DeserializeOwned;
use serde_json::Value;

const API_ROOT: &str = "/api/v1/dashboard";

#[derive(Debug, Clone, Default)]
pub struct DashboardApiClient;

impl DashboardApiClient {
    pub fn new() -> Self {
        Self
    }

    async fn get_as<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> NetworkResult<T> {
        // Null/blank parameters never reach the query string.
        let query: Vec<(&str, &str)> = params
            .iter()
            .map(|(key, value)| (*key, value.trim()))
            .filter(|(_, value)| !value.is_empty())
            .collect();

        let response = Request::get(path)
            .query(query)
            .send()
            .await
            .map_err(|err| DashboardError::NetworkError(format!("{}: {:?}", path, err)))?;

        if !response.ok() {
            get_logger().warn(
                LogComponent::Infrastructure("DashboardApi"),
                &format!("{} returned HTTP {}", path, response.status()),
            );
            return Err(DashboardError::NetworkError(format!(
                "{}: HTTP {}",
                path,
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| DashboardError::NetworkError(format!("{}: parse: {:?}", path, err)))
    }
}

fn encode_path_segment(segment: &str) -> String {
    js_sys::encode_uri_component(segment).into()
}

impl DashboardGateway for DashboardApiClient {
    async fn fetch_summary(&self) -> NetworkResult<Value> {
        self.get_as(&format!("{}/summary", API_ROOT), &[]).await
    }

    async fn fetch_runs(&self, limit: u32) -> NetworkResult<Vec<Value>> {
        self.get_as(&format!("{}/runs", API_ROOT), &[("limit", limit.to_string())]).await
    }

    async fn fetch_instrument_options(
        &self,
        query: &str,
        limit: u32,
    ) -> NetworkResult<Vec<InstrumentOption>> {
        self.get_as(
            &format!("{}/instrument-options", API_ROOT),
            &[("q", query.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn fetch_instrument_profile(&self, external_code: &str) -> NetworkResult<Value> {
        self.get_as(
            &format!(
                "{}/instruments/{}/profile",
                API_ROOT,
                encode_path_segment(external_code)
            ),
            &[],
        )
        .await
    }

    async fn fetch_prices(&self, query: &PriceQuery) -> NetworkResult<OhlcvPage> {
        self.get_as(
            &format!("{}/prices", API_ROOT),
            &[
                ("external_code", query.external_code.clone()),
                ("date_from", query.date_from.clone()),
                ("date_to", query.date_to.clone()),
            ],
        )
        .await
    }

    async fn fetch_benchmarks(&self) -> NetworkResult<Vec<BenchmarkIndex>> {
        self.get_as(&format!("{}/benchmarks", API_ROOT), &[]).await
    }

    async fn fetch_benchmark_series_options(
        &self,
        index_code: &str,
    ) -> NetworkResult<Vec<BenchmarkSeriesOption>> {
        self.get_as(
            &format!("{}/benchmark-series", API_ROOT),
            &[("index_code", index_code.to_string())],
        )
        .await
    }

    async fn fetch_benchmark_rows(&self, query: &BenchmarkQuery) -> NetworkResult<OhlcvPage> {
        self.get_as(
            &format!("{}/benchmarks/{}", API_ROOT, encode_path_segment(&query.index_code)),
            &[
                ("series_name", query.series_name.clone()),
                ("date_from", query.date_from.clone()),
                ("date_to", query.date_to.clone()),
                ("limit", query.limit.to_string()),
                ("offset", query.offset.to_string()),
            ],
        )
        .await
    }

    async fn fetch_quality_issues(
        &self,
        limit: u32,
        severity: &str,
    ) -> NetworkResult<Vec<Value>> {
        self.get_as(
            &format!("{}/quality-issues", API_ROOT),
            &[("limit", limit.to_string()), ("severity", severity.to_string())],
        )
        .await
    }
}
