//! Paste automation
//!
//! Remembers which application was frontmost when the popup opened and sends
//! ⌘V back to it after an entry is chosen.

#[cfg(not(target_os = "macos"))]
use crate::shared::errors::{CommandError, CommandResult};
use std::sync::Mutex;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "macos")]
pub use macos::{check_accessibility_permissions, frontmost_app, paste_into};

/// Delay between re-activating the target app and sending ⌘V
pub const PASTE_DELAY_MS: u64 = 100;

/// An application that can receive a paste
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontApp {
    pub pid: i32,
    pub name: String,
}

#[cfg(not(target_os = "macos"))]
pub fn frontmost_app() -> CommandResult<FrontApp> {
    Err(CommandError::AutomationError(
        "Not supported on this platform".to_string(),
    ))
}

#[cfg(not(target_os = "macos"))]
pub fn paste_into(_target: Option<&FrontApp>, _delay_ms: u64) -> CommandResult<()> {
    Err(CommandError::AutomationError(
        "Not supported on this platform".to_string(),
    ))
}

#[cfg(not(target_os = "macos"))]
pub fn check_accessibility_permissions() -> bool {
    true
}

/// Application that should receive the paste
#[derive(Default)]
pub struct PasteTarget {
    app: Mutex<Option<FrontApp>>,
}

impl PasteTarget {
    /// Record the current frontmost application. Our own process and read
    /// failures keep the old value.
    pub fn capture(&self) {
        match frontmost_app() {
            Ok(app) if app.pid as u32 == std::process::id() => {
                log::debug!("[PasteTarget] Macopy is frontmost, keeping previous target")
            }
            Ok(app) => self.set(Some(app)),
            Err(e) => log::debug!("[PasteTarget] Could not read frontmost app: {}", e),
        }
    }

    pub fn set(&self, app: Option<FrontApp>) {
        let mut guard = match self.app.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = app;
    }

    pub fn get(&self) -> Option<FrontApp> {
        match self.app.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Paste into the remembered application on a blocking thread.
    /// Errors are logged, never surfaced.
    pub fn paste(&self) {
        let target = self.get();
        tauri::async_runtime::spawn_blocking(move || {
            if let Err(e) = paste_into(target.as_ref(), PASTE_DELAY_MS) {
                log::error!("[AutoPaste] {}", e);
            }
        });
    }
}
