mod common;

use common::{install_dashboard, raw_row};
use krx_dashboard_wasm::application::dashboard::with_dashboard_mut;
use krx_dashboard_wasm::domain::market_data::{
    DEFAULT_PRICE_MA, MA_SETTINGS_KEY, MAX_MA_COUNT, MAX_MA_PERIOD, MIN_MA_PERIOD, PeriodSet,
    decode_ma_settings,
};
use quickcheck_macros::quickcheck;

fn invariants_hold(set: &PeriodSet) -> bool {
    let periods = set.periods();
    periods.len() <= MAX_MA_COUNT
        && periods.iter().all(|&p| (MIN_MA_PERIOD..=MAX_MA_PERIOD).contains(&p))
        && periods.windows(2).all(|pair| pair[0] < pair[1])
}

#[quickcheck]
fn invariants_survive_any_mutation_sequence(ops: Vec<(bool, i64)>) -> bool {
    let mut set = PeriodSet::defaults(&DEFAULT_PRICE_MA);
    for (add, value) in ops {
        if add {
            let _ = set.add(Some(value));
        } else {
            set.remove(value.rem_euclid(260) as u32);
        }
        if !invariants_hold(&set) {
            return false;
        }
    }
    true
}

#[test]
fn add_keeps_ascending_order() {
    let mut set = PeriodSet::defaults(&[5, 20]);
    assert_eq!(set.add(Some(3)), Ok(3));
    assert_eq!(set.periods(), &[3, 5, 20]);
}

#[test]
fn remove_absent_period_is_a_no_op() {
    let mut set = PeriodSet::defaults(&[5, 20]);
    assert!(!set.remove(60));
    assert_eq!(set.periods(), &[5, 20]);
}

#[test]
fn adding_period_persists_and_rerenders_charts() {
    let (backend, settings) = install_dashboard();
    with_dashboard_mut(|d| {
        d.prices = vec![
            raw_row("2024-01-02", 10.0, 12.0, 9.0, 11.0, 100.0),
            raw_row("2024-01-03", 11.0, 13.0, 10.0, 12.0, 120.0),
        ];
        d.render_price_chart();
    });
    let charts_before = backend.chart_count();
    let writes_before = settings.write_count();

    let added = with_dashboard_mut(|d| d.add_price_ma("3")).unwrap();
    assert!(added);

    with_dashboard_mut(|d| {
        assert_eq!(d.price_ma.periods(), &[3, 5, 20]);
        assert!(d.ma_settings_error.is_empty());
    });
    assert_eq!(settings.write_count(), writes_before + 1);
    // Re-render replaces the chart context.
    assert_eq!(backend.chart_count(), charts_before + 1);

    let (price, _) =
        decode_ma_settings(settings.get(MA_SETTINGS_KEY).as_deref());
    assert_eq!(price.periods(), &[3, 5, 20]);
}

#[test]
fn out_of_range_period_is_rejected_without_side_effects() {
    let (backend, settings) = install_dashboard();
    with_dashboard_mut(|d| {
        d.prices = vec![raw_row("2024-01-02", 10.0, 12.0, 9.0, 11.0, 100.0)];
        d.render_price_chart();
    });
    let charts_before = backend.chart_count();

    let added = with_dashboard_mut(|d| d.add_price_ma("300")).unwrap();
    assert!(!added);

    with_dashboard_mut(|d| {
        assert_eq!(d.price_ma.periods(), &DEFAULT_PRICE_MA);
        assert!(!d.ma_settings_error.is_empty());
    });
    // No persistence call, no re-render.
    assert_eq!(settings.write_count(), 0);
    assert_eq!(backend.chart_count(), charts_before);
}

#[test]
fn duplicate_and_capacity_rejections() {
    let (_, settings) = install_dashboard();
    let added = with_dashboard_mut(|d| d.add_price_ma("5")).unwrap();
    assert!(!added);

    with_dashboard_mut(|d| {
        for period in [30, 45, 60, 90, 120, 240] {
            assert!(d.add_price_ma(&period.to_string()));
        }
        // The set now holds 8 entries; the next add hits the cap.
        assert_eq!(d.price_ma.len(), 8);
        assert!(!d.add_price_ma("7"));
        assert!(!d.ma_settings_error.is_empty());
    });
    assert_eq!(settings.write_count(), 6);
}

#[test]
fn non_integer_input_is_rejected_inline() {
    install_dashboard();
    with_dashboard_mut(|d| {
        assert!(!d.add_volume_ma("7.5"));
        assert!(!d.ma_settings_error.is_empty());
        assert!(!d.add_volume_ma("abc"));
        assert!(!d.add_volume_ma(""));
    });
}

#[test]
fn removing_a_period_persists_and_updates_set() {
    let (_, settings) = install_dashboard();
    with_dashboard_mut(|d| {
        d.remove_price_ma(5);
        assert_eq!(d.price_ma.periods(), &[20]);
    });
    assert_eq!(settings.write_count(), 1);
}
