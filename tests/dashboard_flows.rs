mod common;

use common::{StubGateway, install_dashboard, instrument, page, raw_row};
use futures::executor::block_on;
use krx_dashboard_wasm::application::dashboard::{
    INSTRUMENT_BENCH_CHART_CONTAINER, PRICE_CHART_CONTAINER, load_prices,
    on_instrument_benchmark_toggle, resolve_benchmark_default_series_name,
    resolve_benchmark_index_code, with_dashboard, with_dashboard_mut,
};
use krx_dashboard_wasm::domain::chart::LogicalRange;
use krx_dashboard_wasm::domain::repositories::{BenchmarkIndex, BenchmarkSeriesOption};

fn bench_index(code: &str) -> BenchmarkIndex {
    BenchmarkIndex { index_code: code.to_string(), series_count: Some(1) }
}

fn series_option(name: &str) -> BenchmarkSeriesOption {
    BenchmarkSeriesOption { index_name: name.to_string() }
}

#[test]
fn market_code_maps_to_index_family_and_default_series() {
    assert_eq!(resolve_benchmark_index_code("KOSPI"), "KOSPI");
    assert_eq!(resolve_benchmark_index_code("kosdaq"), "KOSDAQ");
    assert_eq!(resolve_benchmark_index_code("KONEX"), "KRX");
    assert_eq!(resolve_benchmark_index_code(""), "KRX");

    assert_eq!(resolve_benchmark_default_series_name("KOSPI"), "코스피 200");
    assert_eq!(resolve_benchmark_default_series_name("KOSDAQ"), "코스닥 150");
    assert_eq!(resolve_benchmark_default_series_name("KONEX"), "");
}

#[test]
fn index_default_falls_back_to_the_first_available_choice() {
    install_dashboard();
    with_dashboard_mut(|d| {
        d.selected_instrument = Some(instrument("005930", "KOSPI"));
        d.benchmarks = vec![bench_index("KOSDAQ"), bench_index("KRX")];
        d.ensure_instrument_benchmark_index_default();
        // KOSPI is not offered; the first listed index wins.
        assert_eq!(d.instrument_bench_index_code, "KOSDAQ");

        d.benchmarks = vec![bench_index("KOSDAQ"), bench_index("KOSPI")];
        d.instrument_bench_index_code.clear();
        d.ensure_instrument_benchmark_index_default();
        assert_eq!(d.instrument_bench_index_code, "KOSPI");
    });
}

#[test]
fn price_load_renders_chart_and_pulls_the_benchmark_overlay() {
    let (backend, _) = install_dashboard();
    let gateway = StubGateway::new();
    *gateway.benchmarks.borrow_mut() = vec![bench_index("KOSPI"), bench_index("KOSDAQ")];
    *gateway.series_options.borrow_mut() =
        vec![series_option("코스피 100"), series_option("코스피 200")];
    // Feed order is newest-first, as the API returns it.
    gateway.price_pages.borrow_mut().push_back(page(vec![
        raw_row("2024-01-03", 11.0, 13.0, 10.0, 12.0, 120.0),
        raw_row("2024-01-02", 10.0, 12.0, 9.0, 11.0, 100.0),
    ]));
    gateway.bench_pages.borrow_mut().push_back(page(vec![
        raw_row("2024-01-03", 401.0, 405.0, 399.0, 404.0, 0.0),
        raw_row("2024-01-02", 400.0, 402.0, 398.0, 401.0, 0.0),
    ]));

    with_dashboard_mut(|d| {
        d.selected_instrument = Some(instrument("005930", "KOSPI"));
        d.benchmarks = vec![bench_index("KOSPI"), bench_index("KOSDAQ")];
        d.show_instrument_bench = true;
    });

    block_on(load_prices(&*gateway));

    with_dashboard(|d| {
        // Rows were reversed into ascending order before the builder.
        assert_eq!(d.prices[0].trade_date, "2024-01-02");
        assert!(d.price_chart.is_some());
        assert!(d.instrument_bench_chart.is_some());
        assert_eq!(d.instrument_bench_index_code, "KOSPI");
        // Default series resolved by market code, exact match required.
        assert_eq!(d.instrument_bench_series_name, "코스피 200");
        assert!(d.sync_bridge.is_wired());
        assert!(!d.instrument_bench_loading);
    });

    // The two live charts are mirrored: pan the price chart, the overlay
    // chart follows.
    let price_chart = backend.live_chart(PRICE_CHART_CONTAINER).expect("price chart");
    let bench_chart =
        backend.live_chart(INSTRUMENT_BENCH_CHART_CONTAINER).expect("bench chart");
    price_chart.emit_range(Some(LogicalRange { from: 0.0, to: 1.5 }));
    assert_eq!(bench_chart.set_range_calls.borrow().len(), 1);
}

#[test]
fn turning_the_overlay_off_resets_everything() {
    let (backend, _) = install_dashboard();
    let gateway = StubGateway::new();
    *gateway.series_options.borrow_mut() = vec![series_option("코스피 200")];
    gateway.price_pages.borrow_mut().push_back(page(vec![raw_row(
        "2024-01-02",
        10.0,
        12.0,
        9.0,
        11.0,
        100.0,
    )]));
    gateway
        .bench_pages
        .borrow_mut()
        .push_back(page(vec![raw_row("2024-01-02", 400.0, 402.0, 398.0, 401.0, 0.0)]));

    with_dashboard_mut(|d| {
        d.selected_instrument = Some(instrument("005930", "KOSPI"));
        d.benchmarks = vec![bench_index("KOSPI")];
        d.show_instrument_bench = true;
    });
    block_on(load_prices(&*gateway));
    with_dashboard(|d| assert!(d.sync_bridge.is_wired()));

    with_dashboard_mut(|d| d.show_instrument_bench = false);
    block_on(on_instrument_benchmark_toggle(&*gateway));

    with_dashboard(|d| {
        assert!(!d.sync_bridge.is_wired());
        assert!(d.instrument_bench_chart.is_none());
        assert!(d.instrument_bench_series.is_empty());
        assert!(d.instrument_bench_index_code.is_empty());
    });
    assert!(backend.live_chart(INSTRUMENT_BENCH_CHART_CONTAINER).is_none());
    // The price chart is untouched by the overlay reset.
    assert!(backend.live_chart(PRICE_CHART_CONTAINER).is_some());
}

#[test]
fn selecting_an_instrument_clears_previous_charts_and_state() {
    let (backend, _) = install_dashboard();
    let gateway = StubGateway::new();
    gateway.price_pages.borrow_mut().push_back(page(vec![raw_row(
        "2024-01-02",
        10.0,
        12.0,
        9.0,
        11.0,
        100.0,
    )]));

    with_dashboard_mut(|d| d.selected_instrument = Some(instrument("005930", "KOSPI")));
    block_on(load_prices(&*gateway));
    with_dashboard(|d| assert!(d.price_chart.is_some()));

    with_dashboard_mut(|d| d.select_instrument(instrument("000660", "KOSPI")));
    with_dashboard(|d| {
        assert!(d.price_chart.is_none());
        assert!(d.prices.is_empty());
        assert!(!d.price_queried);
        assert!(d.instrument_profile.is_null());
    });
    assert!(backend.live_chart(PRICE_CHART_CONTAINER).is_none());
}

#[test]
fn empty_series_options_surface_a_message_and_stop() {
    install_dashboard();
    let gateway = StubGateway::new();
    // No series options for the chosen index.
    with_dashboard_mut(|d| {
        d.selected_instrument = Some(instrument("005930", "KOSPI"));
        d.benchmarks = vec![bench_index("KOSPI")];
        d.show_instrument_bench = true;
    });
    block_on(on_instrument_benchmark_toggle(&*gateway));

    with_dashboard(|d| {
        assert!(!d.instrument_bench_loading);
        assert!(!d.instrument_bench_error.is_empty());
        assert!(d.instrument_bench_chart.is_none());
    });
}
