//! Settings persistence: browser localStorage in the app, an in-memory map
//! everywhere else (native logic tests).

use crate::domain::repositories::SettingsGateway;
use std::cell::RefCell;
use std::collections::HashMap;

/// localStorage-backed settings store. Absence of the storage area (privacy
/// mode, sandboxed iframe) degrades to no-op reads and writes.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageSettings;

#[cfg(target_arch = "wasm32")]
impl LocalStorageSettings {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl SettingsGateway for LocalStorageSettings {
    fn load(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn save(&self, key: &str, value: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.set_item(key, value);
        }
    }
}

/// Map-backed settings store; records writes so tests can assert on
/// persistence calls.
#[derive(Debug, Default)]
pub struct InMemorySettings {
    entries: RefCell<HashMap<String, String>>,
    write_count: std::cell::Cell<usize>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.entries.borrow_mut().insert(key.to_string(), value.to_string());
        store
    }

    pub fn write_count(&self) -> usize {
        self.write_count.get()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl SettingsGateway for InMemorySettings {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        self.write_count.set(self.write_count.get() + 1);
    }
}
