//! Application layer: chart context lifecycle, cross-chart sync and the
//! dashboard orchestrator.

pub mod chart_context;
pub mod dashboard;
pub mod sync_bridge;

pub use chart_context::*;
pub use dashboard::*;
pub use sync_bridge::*;
