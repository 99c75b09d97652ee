use krx_dashboard_wasm::application::chart_context::ChartContext;
use krx_dashboard_wasm::application::sync_bridge::ChartSyncBridge;
use krx_dashboard_wasm::domain::chart::{ChartPoint, CrosshairMove, LogicalRange};
use krx_dashboard_wasm::domain::market_data::{BusinessDate, CandleRow, CandleRowSet};
use krx_dashboard_wasm::infrastructure::charting::RecordingBackend;

fn row(day: i32, close: f64) -> CandleRow {
    CandleRow {
        time: BusinessDate::new(2024, 1, day),
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 10.0,
        trade_date: format!("2024-01-{:02}", day),
    }
}

fn context(backend: &RecordingBackend, container: &str, days: &[i32]) -> ChartContext {
    let mut context = ChartContext::create(backend, container).expect("context");
    let rows: Vec<CandleRow> =
        days.iter().map(|&day| row(day, 100.0 + day as f64)).collect();
    context.render(CandleRowSet::new(rows), &[], &[]);
    context
}

fn inside_move(day: i32) -> CrosshairMove {
    CrosshairMove {
        time: Some(BusinessDate::new(2024, 1, day)),
        point: Some(ChartPoint { x: 40.0, y: 40.0 }),
        samples: Vec::new(),
    }
}

#[test]
fn range_change_propagates_exactly_once_without_bouncing_back() {
    let backend = RecordingBackend::new();
    let instrument = context(&backend, "priceChart", &[1, 3]);
    let bench = context(&backend, "instrumentBenchChart", &[1, 2, 3]);
    let (chart_a, chart_b) = (backend.chart(0), backend.chart(1));

    let mut bridge = ChartSyncBridge::new();
    bridge.wire(&instrument, &bench);

    // A user pan on chart A: the recording chart re-emits B's own range
    // event when the bridge applies the range, same as the real library.
    chart_a.emit_range(Some(LogicalRange { from: 2.0, to: 9.0 }));

    assert_eq!(chart_b.set_range_calls.borrow().len(), 1);
    assert_eq!(chart_b.set_range_calls.borrow()[0], LogicalRange { from: 2.0, to: 9.0 });
    // No echo back into A.
    assert_eq!(chart_a.set_range_calls.borrow().len(), 0);

    // And the mirror direction works symmetrically.
    chart_b.emit_range(Some(LogicalRange { from: 1.0, to: 4.0 }));
    assert_eq!(chart_a.set_range_calls.borrow().len(), 1);
    assert_eq!(chart_b.set_range_calls.borrow().len(), 1);
}

#[test]
fn null_ranges_are_ignored() {
    let backend = RecordingBackend::new();
    let instrument = context(&backend, "priceChart", &[1, 3]);
    let bench = context(&backend, "instrumentBenchChart", &[1, 2, 3]);
    let chart_b = backend.chart(1);

    let mut bridge = ChartSyncBridge::new();
    bridge.wire(&instrument, &bench);

    backend.chart(0).emit_range(None);
    assert!(chart_b.set_range_calls.borrow().is_empty());
}

#[test]
fn crosshair_translates_through_the_date_key_not_the_index() {
    let backend = RecordingBackend::new();
    // Different trading calendars: A lacks Jan 2.
    let instrument = context(&backend, "priceChart", &[1, 3]);
    let bench = context(&backend, "instrumentBenchChart", &[1, 2, 3]);
    let (chart_a, chart_b) = (backend.chart(0), backend.chart(1));

    let mut bridge = ChartSyncBridge::new();
    bridge.wire(&instrument, &bench);

    chart_a.emit_crosshair(&inside_move(3));

    let positions = chart_b.crosshair_positions.borrow();
    assert_eq!(positions.len(), 1);
    let (series, price, time) = positions[0];
    assert_eq!(series, bench.candle_series());
    // Matched by exact date key: B's Jan 3 close, not B's index-1 entry.
    assert_eq!(price, 103.0);
    assert_eq!(time, BusinessDate::new(2024, 1, 3));
}

#[test]
fn missing_target_row_clears_the_crosshair() {
    let backend = RecordingBackend::new();
    let instrument = context(&backend, "priceChart", &[1, 3]);
    let bench = context(&backend, "instrumentBenchChart", &[1, 2, 3]);
    let (chart_a, chart_b) = (backend.chart(0), backend.chart(1));

    let mut bridge = ChartSyncBridge::new();
    bridge.wire(&instrument, &bench);

    // B has Jan 2 but A does not: moving B's crosshair there clears A's.
    chart_b.emit_crosshair(&inside_move(2));
    assert_eq!(chart_a.clear_crosshair_calls.get(), 1);
    assert!(chart_a.crosshair_positions.borrow().is_empty());

    // An out-of-plot pointer clears as well.
    chart_a.emit_crosshair(&CrosshairMove {
        time: Some(BusinessDate::new(2024, 1, 1)),
        point: Some(ChartPoint { x: -1.0, y: 5.0 }),
        samples: Vec::new(),
    });
    assert_eq!(chart_b.clear_crosshair_calls.get(), 1);
}

#[test]
fn unwire_removes_both_directions_and_resets_the_guard() {
    let backend = RecordingBackend::new();
    let instrument = context(&backend, "priceChart", &[1, 3]);
    let bench = context(&backend, "instrumentBenchChart", &[1, 2, 3]);
    let (chart_a, chart_b) = (backend.chart(0), backend.chart(1));

    let mut bridge = ChartSyncBridge::new();
    bridge.wire(&instrument, &bench);
    assert!(bridge.is_wired());
    // Tooltip handler plus bridge handler on each chart.
    assert_eq!(chart_a.crosshair_handler_count(), 2);
    assert_eq!(chart_a.range_handler_count(), 1);

    bridge.unwire();
    assert!(!bridge.is_wired());
    assert_eq!(chart_a.crosshair_handler_count(), 1);
    assert_eq!(chart_a.range_handler_count(), 0);
    assert_eq!(chart_b.range_handler_count(), 0);

    chart_a.emit_range(Some(LogicalRange { from: 0.0, to: 5.0 }));
    assert!(chart_b.set_range_calls.borrow().is_empty());
}

#[test]
fn rewire_replaces_the_previous_wiring() {
    let backend = RecordingBackend::new();
    let instrument = context(&backend, "priceChart", &[1, 3]);
    let bench = context(&backend, "instrumentBenchChart", &[1, 2, 3]);
    let (chart_a, chart_b) = (backend.chart(0), backend.chart(1));

    let mut bridge = ChartSyncBridge::new();
    bridge.wire(&instrument, &bench);
    bridge.wire(&instrument, &bench);

    // One bridge subscription per chart per event, not two.
    assert_eq!(chart_a.range_handler_count(), 1);
    chart_a.emit_range(Some(LogicalRange { from: 0.0, to: 5.0 }));
    assert_eq!(chart_b.set_range_calls.borrow().len(), 1);
}

#[test]
fn propagation_failure_releases_the_guard() {
    let backend = RecordingBackend::new();
    let instrument = context(&backend, "priceChart", &[1, 3]);
    backend.fail_set_range.set(true);
    let bench = context(&backend, "instrumentBenchChart", &[1, 2, 3]);
    let (chart_a, chart_b) = (backend.chart(0), backend.chart(1));

    let mut bridge = ChartSyncBridge::new();
    bridge.wire(&instrument, &bench);

    chart_a.emit_range(Some(LogicalRange { from: 0.0, to: 5.0 }));
    assert_eq!(chart_b.set_range_calls.borrow().len(), 1);

    // The failed propagation must not leave sync disabled.
    chart_a.emit_range(Some(LogicalRange { from: 1.0, to: 6.0 }));
    assert_eq!(chart_b.set_range_calls.borrow().len(), 2);
    // Crosshair sync still works after the range failure.
    chart_a.emit_crosshair(&inside_move(1));
    assert_eq!(chart_b.crosshair_positions.borrow().len(), 1);
}

#[test]
fn missing_event_capability_degrades_to_independent_charts() {
    let backend = RecordingBackend::new();
    backend.range_events_supported.set(false);
    backend.crosshair_events_supported.set(false);
    let instrument = context(&backend, "priceChart", &[1, 3]);
    let bench = context(&backend, "instrumentBenchChart", &[1, 2, 3]);

    let mut bridge = ChartSyncBridge::new();
    bridge.wire(&instrument, &bench);
    assert!(!bridge.is_wired());
    assert_eq!(backend.chart(0).range_handler_count(), 0);
}
