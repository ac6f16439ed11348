use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Prefix of every image entry's content
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// One clipboard history entry.
///
/// Serialized as `{"type": "text" | "image", "content": string}`. Image content
/// is a self-contained PNG data URL so it can travel as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
#[ts(export, export_to = "../ui/bindings.ts")]
pub enum HistoryEntry {
    Text(String),
    Image(String),
}

impl HistoryEntry {
    pub fn content(&self) -> &str {
        match self {
            HistoryEntry::Text(content) | HistoryEntry::Image(content) => content,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, HistoryEntry::Image(_))
    }
}

/// "Clipboard changed, re-read now". Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherSignal;

// Cursor positioning types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: f64,
    pub y: f64,
}

/// Usable region of a display (menu bar and dock excluded), logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl WorkArea {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, point: CursorPosition) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopupSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../ui/bindings.ts")]
pub struct WindowPosition {
    pub x: f64,
    pub y: f64,
}
