//! Clipboard command module
//!
//! History reads, promotion and direct clipboard writes from the popup UI.
//! All commands are async so they run off the main thread.

use crate::api::actions;
use crate::core::clipboard::HistoryService;
use crate::shared::errors::CommandResult;
use crate::shared::types::HistoryEntry;
use crate::system::automation::PasteTarget;
use tauri::{AppHandle, State};

/// Current history, most recent first
#[tauri::command]
pub async fn get_clipboard_history(history: State<'_, HistoryService>) -> CommandResult<Vec<HistoryEntry>> {
    Ok(history.snapshot().entries)
}

/// Write entry `index` back to the clipboard without pasting
#[tauri::command]
pub async fn promote_history_item(
    history: State<'_, HistoryService>,
    index: usize,
) -> CommandResult<HistoryEntry> {
    history.promote(index)
}

/// Write entry `index` back to the clipboard, hide the popup and paste it
#[tauri::command]
pub async fn paste_history_item(app: AppHandle, index: usize) -> CommandResult<HistoryEntry> {
    actions::promote_and_paste(&app, index)
}

#[tauri::command]
pub async fn copy_text(history: State<'_, HistoryService>, text: String) -> CommandResult<()> {
    history.clipboard().write_text(&text)
}

/// Write a `data:image/png;base64,...` URL to the clipboard as PNG
#[tauri::command]
pub async fn copy_image(history: State<'_, HistoryService>, data_url: String) -> CommandResult<()> {
    history.clipboard().write_image(&data_url)
}

/// Send ⌘V to the application that was frontmost when the popup opened
#[tauri::command]
pub async fn paste_from_clipboard(target: State<'_, PasteTarget>) -> CommandResult<()> {
    target.paste();
    Ok(())
}
