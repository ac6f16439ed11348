//! Persisted key-value state
//!
//! The host reads `history`, `shortcut` and `showTrayIcon` at startup and
//! writes them on every mutation. The backing store is `tauri-plugin-store`;
//! [`MemoryStore`] stands in when the store file cannot be opened.

use crate::shared::errors::{CommandError, CommandResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
    fn save(&self) -> CommandResult<()>;
}

impl<R: tauri::Runtime> KeyValueStore for tauri_plugin_store::Store<R> {
    fn get(&self, key: &str) -> Option<Value> {
        tauri_plugin_store::Store::get(self, key)
    }

    fn set(&self, key: &str, value: Value) {
        tauri_plugin_store::Store::set(self, key, value);
    }

    fn save(&self) -> CommandResult<()> {
        tauri_plugin_store::Store::save(self).map_err(|e| CommandError::StoreError(e.to_string()))
    }
}

/// Process-lifetime store: nothing survives a restart
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save` calls so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        let values = match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let mut values = match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.insert(key.to_string(), value);
    }

    fn save(&self) -> CommandResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
