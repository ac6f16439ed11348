//! Settings command module
//!
//! Tray visibility and popup shortcut, persisted in `store.json`.

use crate::api::actions;
use crate::core::shortcut::ShortcutBinding;
use crate::shared::errors::CommandResult;
use crate::shared::settings::{AppSettings, SettingsState};
use tauri::{AppHandle, State};

/// Flip tray icon visibility; returns the new state
#[tauri::command]
pub async fn toggle_tray_icon(app: AppHandle) -> CommandResult<bool> {
    actions::toggle_tray_icon(&app)
}

#[tauri::command]
pub async fn get_tray_icon_state(settings: State<'_, SettingsState>) -> CommandResult<bool> {
    Ok(settings.get().show_tray_icon)
}

#[tauri::command]
pub async fn get_settings(settings: State<'_, SettingsState>) -> CommandResult<AppSettings> {
    Ok(settings.get())
}

/// Switch the popup shortcut
#[tauri::command]
pub async fn set_shortcut(app: AppHandle, shortcut: ShortcutBinding) -> CommandResult<AppSettings> {
    actions::switch_shortcut(&app, shortcut)
}
