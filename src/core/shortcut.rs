//! Popup shortcut bindings
//!
//! Exactly one binding is registered at a time. Switching unregisters the old
//! chord before registering the new one, all under one lock.

use crate::shared::errors::{CommandError, CommandResult};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tauri::{AppHandle, Runtime};
use tauri_plugin_global_shortcut::{Code, GlobalShortcutExt, Modifiers, Shortcut};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../ui/bindings.ts")]
pub enum ShortcutBinding {
    #[default]
    #[serde(rename = "Alt+V")]
    OptionV,
    #[serde(rename = "CommandOrControl+Shift+V")]
    CommandShiftV,
    #[serde(rename = "Control+Alt+V")]
    ControlOptionV,
}

impl ShortcutBinding {
    pub const ALL: [ShortcutBinding; 3] = [
        ShortcutBinding::OptionV,
        ShortcutBinding::CommandShiftV,
        ShortcutBinding::ControlOptionV,
    ];

    /// Identifier persisted under the `shortcut` key
    pub fn id(self) -> &'static str {
        match self {
            ShortcutBinding::OptionV => "Alt+V",
            ShortcutBinding::CommandShiftV => "CommandOrControl+Shift+V",
            ShortcutBinding::ControlOptionV => "Control+Alt+V",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|binding| binding.id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            ShortcutBinding::OptionV => "⌥ Option + V",
            ShortcutBinding::CommandShiftV => "⌘ Shift + V",
            ShortcutBinding::ControlOptionV => "⌃ Ctrl + Option + V",
        }
    }

    /// Tray menu item id
    pub fn menu_id(self) -> &'static str {
        match self {
            ShortcutBinding::OptionV => "shortcut_alt_v",
            ShortcutBinding::CommandShiftV => "shortcut_cmd_shift_v",
            ShortcutBinding::ControlOptionV => "shortcut_ctrl_alt_v",
        }
    }

    pub fn from_menu_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|binding| binding.menu_id() == id)
    }

    pub fn to_shortcut(self) -> Shortcut {
        match self {
            ShortcutBinding::OptionV => Shortcut::new(Some(Modifiers::ALT), Code::KeyV),
            ShortcutBinding::CommandShiftV => {
                Shortcut::new(Some(Modifiers::SUPER | Modifiers::SHIFT), Code::KeyV)
            }
            ShortcutBinding::ControlOptionV => {
                Shortcut::new(Some(Modifiers::CONTROL | Modifiers::ALT), Code::KeyV)
            }
        }
    }
}

/// Seam over the OS global-shortcut service
pub trait ShortcutRegistrar: Send + Sync {
    fn register(&self, binding: ShortcutBinding) -> CommandResult<()>;
    fn unregister(&self, binding: ShortcutBinding) -> CommandResult<()>;
}

/// Registers bindings through tauri-plugin-global-shortcut. The press handler
/// itself is installed once on the plugin builder.
pub struct GlobalShortcutRegistrar<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> GlobalShortcutRegistrar<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: Runtime> ShortcutRegistrar for GlobalShortcutRegistrar<R> {
    fn register(&self, binding: ShortcutBinding) -> CommandResult<()> {
        self.app
            .global_shortcut()
            .register(binding.to_shortcut())
            .map_err(|e| CommandError::ShortcutError(format!("{}: {}", binding.id(), e)))
    }

    fn unregister(&self, binding: ShortcutBinding) -> CommandResult<()> {
        self.app
            .global_shortcut()
            .unregister(binding.to_shortcut())
            .map_err(|e| CommandError::ShortcutError(format!("{}: {}", binding.id(), e)))
    }
}

pub struct ShortcutManager {
    registrar: Box<dyn ShortcutRegistrar>,
    active: Mutex<Option<ShortcutBinding>>,
}

impl ShortcutManager {
    pub fn new(registrar: Box<dyn ShortcutRegistrar>) -> Self {
        Self {
            registrar,
            active: Mutex::new(None),
        }
    }

    pub fn active(&self) -> Option<ShortcutBinding> {
        match self.active.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Make `next` the only registered binding.
    ///
    /// When `next` cannot be registered the previous binding is restored and
    /// the registration error is returned.
    pub fn activate(&self, next: ShortcutBinding) -> CommandResult<()> {
        let mut active = match self.active.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("[Shortcut] Mutex poisoned, recovering...");
                poisoned.into_inner()
            }
        };

        if *active == Some(next) {
            return Ok(());
        }

        let previous = *active;
        if let Some(previous) = previous {
            self.registrar.unregister(previous)?;
            *active = None;
        }

        match self.registrar.register(next) {
            Ok(()) => {
                log::info!("[Shortcut] Registered {}", next.id());
                *active = Some(next);
                Ok(())
            }
            Err(e) => {
                log::error!("[Shortcut] Failed to register {}: {}", next.id(), e);
                if let Some(previous) = previous {
                    match self.registrar.register(previous) {
                        Ok(()) => *active = Some(previous),
                        Err(restore) => log::error!(
                            "[Shortcut] Failed to restore {}: {}",
                            previous.id(),
                            restore
                        ),
                    }
                }
                Err(e)
            }
        }
    }

    /// Unregister whatever is active (app exit)
    pub fn deactivate(&self) {
        let mut active = match self.active.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = active.take() {
            if let Err(e) = self.registrar.unregister(previous) {
                log::warn!("[Shortcut] Failed to unregister {}: {}", previous.id(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingRegistrar {
        calls: Arc<Mutex<Vec<String>>>,
        reject: Option<ShortcutBinding>,
    }

    impl ShortcutRegistrar for RecordingRegistrar {
        fn register(&self, binding: ShortcutBinding) -> CommandResult<()> {
            self.calls.lock().unwrap().push(format!("register {}", binding.id()));
            if self.reject == Some(binding) {
                return Err(CommandError::ShortcutError("taken".to_string()));
            }
            Ok(())
        }

        fn unregister(&self, binding: ShortcutBinding) -> CommandResult<()> {
            self.calls.lock().unwrap().push(format!("unregister {}", binding.id()));
            Ok(())
        }
    }

    fn manager(reject: Option<ShortcutBinding>) -> (ShortcutManager, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let registrar = RecordingRegistrar { calls: calls.clone(), reject };
        (ShortcutManager::new(Box::new(registrar)), calls)
    }

    #[test]
    fn test_switch_unregisters_before_registering() {
        let (manager, calls) = manager(None);
        manager.activate(ShortcutBinding::OptionV).unwrap();
        manager.activate(ShortcutBinding::ControlOptionV).unwrap();

        assert_eq!(manager.active(), Some(ShortcutBinding::ControlOptionV));
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["register Alt+V", "unregister Alt+V", "register Control+Alt+V"]
        );
    }

    #[test]
    fn test_same_binding_is_noop() {
        let (manager, calls) = manager(None);
        manager.activate(ShortcutBinding::OptionV).unwrap();
        manager.activate(ShortcutBinding::OptionV).unwrap();
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_switch_restores_previous() {
        let (manager, calls) = manager(Some(ShortcutBinding::CommandShiftV));
        manager.activate(ShortcutBinding::OptionV).unwrap();

        let err = manager.activate(ShortcutBinding::CommandShiftV).unwrap_err();
        assert!(matches!(err, CommandError::ShortcutError(_)));
        assert_eq!(manager.active(), Some(ShortcutBinding::OptionV));
        assert_eq!(calls.lock().unwrap().last().unwrap(), "register Alt+V");
    }

    #[test]
    fn test_deactivate() {
        let (manager, calls) = manager(None);
        manager.activate(ShortcutBinding::OptionV).unwrap();
        manager.deactivate();
        assert_eq!(manager.active(), None);
        assert_eq!(calls.lock().unwrap().last().unwrap(), "unregister Alt+V");
    }

    #[test]
    fn test_binding_ids_roundtrip() {
        for binding in ShortcutBinding::ALL {
            assert_eq!(ShortcutBinding::from_id(binding.id()), Some(binding));
            assert_eq!(ShortcutBinding::from_menu_id(binding.menu_id()), Some(binding));
            let json = serde_json::to_value(binding).unwrap();
            assert_eq!(json, serde_json::Value::String(binding.id().to_string()));
        }
        assert_eq!(ShortcutBinding::from_id("Hyper+V"), None);
    }
}
