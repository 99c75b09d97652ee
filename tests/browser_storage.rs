//! Browser-only checks for the localStorage settings gateway. Run with
//! `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use krx_dashboard_wasm::domain::market_data::{
    MA_SETTINGS_KEY, PeriodSet, decode_ma_settings, encode_ma_settings,
};
use krx_dashboard_wasm::domain::repositories::SettingsGateway;
use krx_dashboard_wasm::infrastructure::storage::LocalStorageSettings;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn settings_round_trip_through_local_storage() {
    let store = LocalStorageSettings::new();
    let price = PeriodSet::defaults(&[3, 5, 20]);
    let volume = PeriodSet::defaults(&[5, 20]);

    store.save(MA_SETTINGS_KEY, &encode_ma_settings(&price, &volume));
    let (loaded_price, loaded_volume) =
        decode_ma_settings(store.load(MA_SETTINGS_KEY).as_deref());

    assert_eq!(loaded_price, price);
    assert_eq!(loaded_volume, volume);
}

#[wasm_bindgen_test]
fn absent_key_falls_back_to_defaults() {
    let store = LocalStorageSettings::new();
    let (price, volume) = decode_ma_settings(store.load("missing_settings_key").as_deref());
    assert_eq!(price.periods(), &[5, 20]);
    assert_eq!(volume.periods(), &[5, 20]);
}
