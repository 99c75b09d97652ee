//! Infrastructure layer: charting adapters, HTTP client, browser storage
//! and console logging.

#[cfg(target_arch = "wasm32")]
pub mod api;
pub mod charting;
#[cfg(target_arch = "wasm32")]
pub mod console_log;
pub mod storage;
