//! Charting adapters: one per supported library version plus a headless
//! recording backend for logic tests.

#[cfg(target_arch = "wasm32")]
pub mod lightweight;
pub mod recording;

#[cfg(target_arch = "wasm32")]
pub use lightweight::*;
pub use recording::*;

use crate::domain::chart::{ChartApi, ChartingBackend};
use std::rc::Rc;

/// Backend used when no charting library could be selected: every chart
/// creation reports "rendering unavailable" and the dashboard falls back to
/// tables and messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableBackend;

impl ChartingBackend for UnavailableBackend {
    fn create_chart(&self, _container_id: &str) -> Option<Rc<dyn ChartApi>> {
        None
    }
}
