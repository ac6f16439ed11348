use crate::core::shortcut::ShortcutBinding;
use crate::shared::types::HistoryEntry;
use serde::Serialize;

/// Events pushed from the host to the popup UI
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum AppEvent {
    /// Full history, most recent first
    #[serde(rename = "clipboard-history")]
    ClipboardHistory(Vec<HistoryEntry>),

    #[serde(rename = "shortcut-changed")]
    ShortcutChanged(ShortcutBinding),
}

impl AppEvent {
    /// Tauri event name
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::ClipboardHistory(_) => "clipboard-history",
            AppEvent::ShortcutChanged(_) => "shortcut-changed",
        }
    }
}
