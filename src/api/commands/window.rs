//! Window management command module
//!
//! Popup visibility and sizing, plus app exit.

use crate::api::actions;
use crate::shared::errors::CommandResult;
use crate::shared::types::WindowPosition;
use crate::system::window::{self, PopupState};
use tauri::{AppHandle, State};

/// Hide the popup window
#[tauri::command]
pub async fn hide_window(app: AppHandle) -> CommandResult<()> {
    window::hide_popup(&app)
}

/// Resize the popup to the height the UI measured (CSS pixels)
#[tauri::command]
pub async fn update_window_height(
    app: AppHandle,
    popup: State<'_, PopupState>,
    height: f64,
) -> CommandResult<()> {
    window::resize_popup(&app, &popup, height)
}

/// Show the popup at the cursor, or hide it when already visible
#[tauri::command]
pub async fn toggle_popup(app: AppHandle) -> CommandResult<()> {
    actions::toggle_popup_at_cursor(&app)
}

/// Current cursor position, logical pixels
#[tauri::command]
pub fn get_cursor_position() -> CommandResult<WindowPosition> {
    let cursor = window::popup::get_cursor_position()?;
    Ok(WindowPosition {
        x: cursor.x,
        y: cursor.y,
    })
}

#[tauri::command]
pub async fn quit_app(app: AppHandle) -> CommandResult<()> {
    actions::quit(&app)
}
