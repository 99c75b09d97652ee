//! Presentation layer: Leptos components over the dashboard orchestrator.

pub mod app;

pub use app::*;
