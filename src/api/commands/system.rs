//! System integration command module
//!
//! Accessibility permission and watcher diagnostics.

use crate::core::watcher::{SharedWatcherStatus, WatcherStatus};
use crate::shared::errors::{CommandError, CommandResult};
use crate::system::automation;
use tauri::State;

/// Check if accessibility permissions are granted (needed for auto-paste)
#[tauri::command]
pub async fn check_accessibility_permissions() -> CommandResult<bool> {
    Ok(automation::check_accessibility_permissions())
}

/// State of the out-of-process clipboard watcher
#[tauri::command]
pub async fn get_watcher_status(status: State<'_, SharedWatcherStatus>) -> CommandResult<WatcherStatus> {
    status
        .lock()
        .map(|guard| *guard)
        .map_err(|e| CommandError::Unknown(format!("Watcher status lock poisoned: {}", e)))
}
