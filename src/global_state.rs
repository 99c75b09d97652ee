use leptos::*;
use once_cell::unsync::OnceCell;

/// Reactive signals shared across the presentation layer. The orchestrator
/// owns the actual dashboard state; `ui_epoch` is bumped after every
/// mutation so views re-read it.
pub struct Globals {
    pub ui_epoch: RwSignal<u32>,
    pub booting: RwSignal<bool>,
}

thread_local! {
    static GLOBALS: OnceCell<Globals> = const { OnceCell::new() };
}

pub fn globals() -> Globals {
    GLOBALS.with(|cell| {
        let globals = cell.get_or_init(|| Globals {
            ui_epoch: create_rw_signal(0),
            booting: create_rw_signal(true),
        });
        Globals { ui_epoch: globals.ui_epoch, booting: globals.booting }
    })
}

/// Signal that orchestrator state changed and views should re-read it.
pub fn bump_ui() {
    globals().ui_epoch.update(|epoch| *epoch += 1);
}

pub fn ui_epoch() -> RwSignal<u32> {
    globals().ui_epoch
}

pub fn booting() -> RwSignal<bool> {
    globals().booting
}
