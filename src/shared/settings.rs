use crate::config::keys;
use crate::core::shortcut::ShortcutBinding;
use crate::shared::errors::CommandResult;
use crate::shared::store::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use ts_rs::TS;

/// User settings persisted next to the history in `store.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../ui/bindings.ts")]
pub struct AppSettings {
    pub shortcut: ShortcutBinding,
    pub show_tray_icon: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            shortcut: ShortcutBinding::default(),
            show_tray_icon: true,
        }
    }
}

impl AppSettings {
    /// Read `shortcut` and `showTrayIcon`. Missing or unknown values fall back
    /// to the defaults.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();

        let shortcut = match store.get(keys::SHORTCUT) {
            Some(value) => match value.as_str().and_then(ShortcutBinding::from_id) {
                Some(binding) => binding,
                None => {
                    log::warn!("[Settings] Unknown shortcut {}, using default", value);
                    defaults.shortcut
                }
            },
            None => defaults.shortcut,
        };

        let show_tray_icon = store
            .get(keys::SHOW_TRAY_ICON)
            .and_then(|value| value.as_bool())
            .unwrap_or(defaults.show_tray_icon);

        Self {
            shortcut,
            show_tray_icon,
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> CommandResult<()> {
        store.set(keys::SHORTCUT, serde_json::to_value(self.shortcut)?);
        store.set(keys::SHOW_TRAY_ICON, serde_json::Value::Bool(self.show_tray_icon));
        store.save()
    }
}

/// Managed settings. Every update is written through to the store.
pub struct SettingsState {
    settings: Mutex<AppSettings>,
}

impl SettingsState {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AppSettings> {
        match self.settings.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("[Settings] Mutex poisoned, recovering...");
                poisoned.into_inner()
            }
        }
    }

    pub fn get(&self) -> AppSettings {
        *self.lock()
    }

    /// Apply `change`, persist, and return the new settings
    pub fn update(
        &self,
        store: &dyn KeyValueStore,
        change: impl FnOnce(&mut AppSettings),
    ) -> CommandResult<AppSettings> {
        let mut settings = self.lock();
        change(&mut settings);
        settings.save(store)?;
        Ok(*settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::store::MemoryStore;

    #[test]
    fn test_defaults_when_store_empty() {
        let store = MemoryStore::new();
        let settings = AppSettings::load(&store);
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.shortcut, ShortcutBinding::OptionV);
        assert!(settings.show_tray_icon);
    }

    #[test]
    fn test_unknown_shortcut_falls_back() {
        let store = MemoryStore::new();
        store.set(keys::SHORTCUT, serde_json::json!("Hyper+V"));
        store.set(keys::SHOW_TRAY_ICON, serde_json::json!(false));

        let settings = AppSettings::load(&store);
        assert_eq!(settings.shortcut, ShortcutBinding::OptionV);
        assert!(!settings.show_tray_icon);
    }

    #[test]
    fn test_update_writes_through() {
        let store = MemoryStore::new();
        let state = SettingsState::new(AppSettings::default());

        let updated = state
            .update(&store, |s| {
                s.shortcut = ShortcutBinding::ControlOptionV;
                s.show_tray_icon = false;
            })
            .unwrap();

        assert_eq!(state.get(), updated);
        assert_eq!(store.get(keys::SHORTCUT), Some(serde_json::json!("Control+Alt+V")));
        assert_eq!(store.get(keys::SHOW_TRAY_ICON), Some(serde_json::json!(false)));
        assert_eq!(AppSettings::load(&store), updated);
    }
}
