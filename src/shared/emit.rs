use super::events::AppEvent;
use crate::core::clipboard::fanout::HistoryObserver;
use crate::core::clipboard::history::HistorySnapshot;
use tauri::{AppHandle, Emitter, Runtime};

/// Emit an application event to all windows
pub fn emit_event<R: Runtime>(app: &AppHandle<R>, event: AppEvent) {
    let result = match &event {
        AppEvent::ClipboardHistory(entries) => app.emit(event.name(), entries),
        AppEvent::ShortcutChanged(binding) => app.emit(event.name(), binding),
    };

    if let Err(e) = result {
        log::error!("Failed to emit {}: {}", event.name(), e);
    }
}

/// Pushes every published history snapshot to the popup UI
pub struct UiObserver<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> UiObserver<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: Runtime> HistoryObserver for UiObserver<R> {
    fn name(&self) -> &'static str {
        "ui"
    }

    fn on_snapshot(&self, snapshot: &HistorySnapshot) {
        emit_event(&self.app, AppEvent::ClipboardHistory(snapshot.entries.clone()));
    }
}
