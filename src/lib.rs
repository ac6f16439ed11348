pub mod api;
pub mod config;
pub mod core;
pub mod shared;
pub mod system;

use crate::config::{DetectorConfig, PopupConfig, POPUP_WINDOW_LABEL, STORE_FILE};
use crate::core::clipboard::{ChangeDetector, ClipboardSource, DetectorTrigger, HistoryService};
use crate::core::shortcut::{GlobalShortcutRegistrar, ShortcutManager};
use crate::core::watcher::{locate_watcher, supervise, SharedWatcherStatus, WatcherStatus};
use crate::shared::emit::UiObserver;
use crate::shared::settings::{AppSettings, SettingsState};
use crate::shared::store::{KeyValueStore, MemoryStore};
use crate::shared::types::WatcherSignal;
use crate::system::automation::{self, PasteTarget};
use crate::system::clipboard::{HostClipboard, PasteboardProbe};
use crate::system::tray::{self, TrayObserver};
use crate::system::window::PopupState;
use std::sync::Arc;
use tauri::{AppHandle, Manager, RunEvent, WindowEvent};
use tauri_plugin_global_shortcut::ShortcutState;
use tauri_plugin_store::StoreExt;
use tokio::sync::mpsc;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        // Registered first. A second launch opens the running host's popup.
        .plugin(tauri_plugin_single_instance::init(|app, _args, _cwd| {
            log::info!("Second launch detected, opening the popup");
            api::actions::request_popup(app);
        }))
        .plugin(system::logging::host_builder().build())
        .plugin(tauri_plugin_store::Builder::default().build())
        .plugin(tauri_plugin_clipboard_manager::init())
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|app, _shortcut, event| {
                    if event.state == ShortcutState::Pressed {
                        api::actions::request_popup(app);
                    }
                })
                .build(),
        )
        .setup(|app| {
            // Menu bar app: no Dock icon
            #[cfg(target_os = "macos")]
            app.set_activation_policy(tauri::ActivationPolicy::Accessory);

            let handle = app.handle().clone();

            let persistence: Arc<dyn KeyValueStore> = match app.store(STORE_FILE) {
                Ok(store) => store,
                Err(e) => {
                    log::error!("Failed to open {}: {}. History will not persist.", STORE_FILE, e);
                    Arc::new(MemoryStore::new())
                }
            };

            let settings = AppSettings::load(persistence.as_ref());
            let clipboard: Arc<dyn ClipboardSource> = Arc::new(HostClipboard::new(handle.clone()));
            let service = HistoryService::load(clipboard, persistence);

            app.manage(SettingsState::new(settings));
            app.manage(PopupState::new(PopupConfig::default()));
            app.manage(PasteTarget::default());
            app.manage(ShortcutManager::new(Box::new(GlobalShortcutRegistrar::new(
                handle.clone(),
            ))));

            tray::create_tray(
                &handle,
                &service.snapshot(),
                settings.shortcut,
                settings.show_tray_icon,
                api::actions::handle_tray_action,
                api::actions::request_popup,
            )?;

            service.subscribe(Arc::new(UiObserver::new(handle.clone())));
            service.subscribe(Arc::new(TrayObserver::new(handle.clone())));
            app.manage(service);

            if let Err(e) = app.state::<ShortcutManager>().activate(settings.shortcut) {
                log::error!("Popup shortcut unavailable: {}. Use the tray menu to pick another.", e);
            }

            if !automation::check_accessibility_permissions() {
                log::warn!("Accessibility permission missing, auto-paste will not work");
            }

            let watcher_status = SharedWatcherStatus::default();
            app.manage(watcher_status.clone());
            start_signal_pipeline(&handle, watcher_status);

            if let Some(window) = app.get_webview_window(POPUP_WINDOW_LABEL) {
                window.hide()?;
            }

            log::info!("Macopy started (shortcut {})", settings.shortcut.id());
            Ok(())
        })
        .on_window_event(|window, event| match event {
            // Closing only hides the popup
            WindowEvent::CloseRequested { api, .. } => {
                api.prevent_close();
                if let Err(e) = window.hide() {
                    log::warn!("Failed to hide {}: {}", window.label(), e);
                }
            }
            WindowEvent::Focused(false) if window.label() == POPUP_WINDOW_LABEL => {
                if let Err(e) = window.hide() {
                    log::warn!("Failed to hide popup on blur: {}", e);
                }
            }
            _ => {}
        })
        .invoke_handler(tauri::generate_handler![
            api::commands::window::hide_window,
            api::commands::window::update_window_height,
            api::commands::window::toggle_popup,
            api::commands::window::get_cursor_position,
            api::commands::window::quit_app,
            api::commands::clipboard::get_clipboard_history,
            api::commands::clipboard::promote_history_item,
            api::commands::clipboard::paste_history_item,
            api::commands::clipboard::copy_text,
            api::commands::clipboard::copy_image,
            api::commands::clipboard::paste_from_clipboard,
            api::commands::settings::toggle_tray_icon,
            api::commands::settings::get_tray_icon_state,
            api::commands::settings::get_settings,
            api::commands::settings::set_shortcut,
            api::commands::system::check_accessibility_permissions,
            api::commands::system::get_watcher_status,
        ])
        .build(tauri::generate_context!())
        .unwrap_or_else(|e| {
            eprintln!("FATAL: Failed to start Macopy: {}", e);
            std::process::exit(1);
        })
        .run(|app, event| {
            if let RunEvent::Exit = event {
                shutdown(app);
            }
        });
}

/// Watcher process, host poll detector, and the single task that applies
/// their signals to the history
fn start_signal_pipeline(app: &AppHandle, status: SharedWatcherStatus) {
    let (signal_tx, mut signal_rx) = mpsc::unbounded_channel::<WatcherSignal>();

    match locate_watcher() {
        Some(path) => {
            let signals = signal_tx.clone();
            tauri::async_runtime::spawn(async move {
                supervise(&path, &[], signals, status).await;
            });
        }
        None => {
            log::warn!("Could not resolve the watcher path, relying on in-process polling");
            if let Ok(mut guard) = status.lock() {
                *guard = WatcherStatus::Missing;
            }
        }
    }

    // No chord hook in the host; the dropped sender leaves the detector polling
    let (_, no_triggers) = mpsc::unbounded_channel::<DetectorTrigger>();
    let detector = ChangeDetector::new(PasteboardProbe);
    tauri::async_runtime::spawn(detector.run(DetectorConfig::host(), no_triggers, signal_tx));

    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        while let Some(signal) = signal_rx.recv().await {
            let app = app.clone();
            // the tray observer waits on the main thread while the lock is held
            let applied = tauri::async_runtime::spawn_blocking(move || {
                app.state::<HistoryService>().handle_signal(signal);
            })
            .await;
            if let Err(e) = applied {
                log::error!("Signal handler failed: {}", e);
            }
        }
    });
}

fn shutdown(app: &AppHandle) {
    if let Some(service) = app.try_state::<HistoryService>() {
        if let Err(e) = service.flush() {
            log::error!("Failed to flush history on exit: {}", e);
        }
    }
    if let Some(shortcuts) = app.try_state::<ShortcutManager>() {
        shortcuts.deactivate();
    }
    log::info!("Macopy stopped");
}
