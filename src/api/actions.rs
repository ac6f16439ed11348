//! User-facing flows shared by the Tauri commands, the tray menu and the
//! global shortcut.
//!
//! These take the history lock, and the tray observer rebuilds menus on the
//! main thread while holding it, so none of them may run on the main thread.

use crate::core::clipboard::HistoryService;
use crate::core::shortcut::{ShortcutBinding, ShortcutManager};
use crate::shared::emit::emit_event;
use crate::shared::errors::CommandResult;
use crate::shared::events::AppEvent;
use crate::shared::settings::{AppSettings, SettingsState};
use crate::shared::types::HistoryEntry;
use crate::system::automation::PasteTarget;
use crate::system::tray::{TrayAction, TRAY_ID};
use crate::system::window::popup::{popup_window, toggle_popup, PopupState};
use tauri::{AppHandle, Manager, Runtime};

/// Global shortcut press: remember the paste target, pick up any change the
/// watcher has not reported yet, then show or hide the popup
pub fn toggle_popup_at_cursor<R: Runtime>(app: &AppHandle<R>) -> CommandResult<()> {
    let service = app.state::<HistoryService>();

    if !popup_window(app)?.is_visible()? {
        app.state::<PasteTarget>().capture();
        if let Some(snapshot) = service.refresh_unpublished() {
            emit_event(app, AppEvent::ClipboardHistory(snapshot.entries));
        }
    }

    toggle_popup(app, &app.state::<PopupState>(), service.snapshot().len())
}

/// Put entry `index` on the clipboard, hide the popup and paste
pub fn promote_and_paste<R: Runtime>(app: &AppHandle<R>, index: usize) -> CommandResult<HistoryEntry> {
    let entry = app.state::<HistoryService>().promote(index)?;
    if let Ok(window) = popup_window(app) {
        window.hide()?;
    }
    app.state::<PasteTarget>().paste();
    Ok(entry)
}

/// Register `binding` as the popup shortcut and persist it
pub fn switch_shortcut<R: Runtime>(app: &AppHandle<R>, binding: ShortcutBinding) -> CommandResult<AppSettings> {
    app.state::<ShortcutManager>().activate(binding)?;

    let service = app.state::<HistoryService>();
    let settings = app
        .state::<SettingsState>()
        .update(service.persistence(), |settings| settings.shortcut = binding)?;

    service.refresh_observers();
    emit_event(app, AppEvent::ShortcutChanged(binding));
    log::info!("[Settings] Shortcut set to {}", binding.id());
    Ok(settings)
}

/// Flip tray icon visibility and persist it. Returns the new state.
pub fn toggle_tray_icon<R: Runtime>(app: &AppHandle<R>) -> CommandResult<bool> {
    let service = app.state::<HistoryService>();
    let settings = app
        .state::<SettingsState>()
        .update(service.persistence(), |settings| {
            settings.show_tray_icon = !settings.show_tray_icon
        })?;

    match app.tray_by_id(TRAY_ID) {
        Some(tray) => tray.set_visible(settings.show_tray_icon)?,
        None => log::warn!("[Tray] Tray icon not found"),
    }

    service.refresh_observers();
    Ok(settings.show_tray_icon)
}

/// Dispatch a tray menu click on a blocking worker
pub fn handle_tray_action<R: Runtime>(app: &AppHandle<R>, action: TrayAction) {
    let app = app.clone();
    tauri::async_runtime::spawn_blocking(move || {
        let result = match action {
            TrayAction::Promote(index) => promote_and_paste(&app, index).map(|_| ()),
            TrayAction::SwitchShortcut(binding) => switch_shortcut(&app, binding).map(|_| ()),
            TrayAction::Quit => {
                app.exit(0);
                Ok(())
            }
        };
        if let Err(e) = result {
            log::error!("[Tray] {:?} failed: {}", action, e);
        }
    });
}

/// Shortcut press, tray icon click or second launch: toggle the popup off
/// the event loop thread
pub fn request_popup<R: Runtime>(app: &AppHandle<R>) {
    let app = app.clone();
    tauri::async_runtime::spawn_blocking(move || {
        if let Err(e) = toggle_popup_at_cursor(&app) {
            log::error!("[Popup] Failed to toggle: {}", e);
        }
    });
}

pub fn quit<R: Runtime>(app: &AppHandle<R>) -> CommandResult<()> {
    app.exit(0);
    Ok(())
}
