pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(target_arch = "wasm32")]
pub mod global_state;
#[cfg(target_arch = "wasm32")]
pub mod presentation;

#[cfg(target_arch = "wasm32")]
mod wasm_entry {
    use crate::application::dashboard::{Dashboard, initialize_dashboard, set_change_notifier};
    use crate::domain::chart::ChartingBackend;
    use crate::domain::logging::{LogComponent, get_logger, init_logger, init_time_provider};
    use crate::global_state::bump_ui;
    use crate::infrastructure::charting::{UnavailableBackend, lightweight::select_backend};
    use crate::infrastructure::console_log::{BrowserTimeProvider, ConsoleLogger};
    use crate::infrastructure::storage::LocalStorageSettings;
    use crate::presentation::{App, boot};
    use leptos::*;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    /// Module start: panic hook plus the logging facade.
    #[wasm_bindgen(start)]
    pub fn initialize() {
        console_error_panic_hook::set_once();
        init_logger(Box::new(ConsoleLogger::new_development()));
        init_time_provider(Box::new(BrowserTimeProvider::new()));
        get_logger().info(LogComponent::Presentation("Init"), "🚀 dashboard module loaded");
    }

    /// Build the orchestrator (charting adapter selected exactly once here),
    /// mount the Leptos app and fire the initial loads.
    #[wasm_bindgen]
    pub fn start_dashboard() {
        let backend: Rc<dyn ChartingBackend> = match select_backend() {
            Some(backend) => backend,
            None => Rc::new(UnavailableBackend),
        };
        let settings = Rc::new(LocalStorageSettings::new());
        initialize_dashboard(Dashboard::new(backend, settings));
        set_change_notifier(bump_ui);

        mount_to_body(App);
        boot();
        get_logger().info(LogComponent::Presentation("Init"), "✅ dashboard mounted");
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_entry::*;
