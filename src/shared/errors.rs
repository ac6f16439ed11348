//! Strict error handling with CommandError enum
//!
//! All errors are serializable so Tauri commands can hand them straight to the
//! frontend.

use serde::Serialize;
use thiserror::Error;

/// Command execution errors
///
/// Detection and IPC failures are absorbed and logged where they happen; only
/// errors on explicit store or window operations travel back to a caller.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum CommandError {
    /// System I/O error (files, child processes)
    #[error("System I/O error: {0}")]
    SystemIO(String),

    /// The OS clipboard could not be read or written
    #[error("Clipboard error: {0}")]
    ClipboardError(String),

    /// Invalid input or parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A history index outside the current history
    #[error("History index {index} out of range (history holds {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Window operation error
    #[error("Window error: {0}")]
    WindowError(String),

    /// Global shortcut registration error
    #[error("Shortcut error: {0}")]
    ShortcutError(String),

    /// Persisted key-value store error
    #[error("Store error: {0}")]
    StoreError(String),

    /// Accessibility permissions denied
    #[error("Accessibility permissions denied. Please enable in System Settings > Privacy & Security > Accessibility.")]
    AccessibilityDenied,

    /// Paste automation failed or is unavailable on this platform
    #[error("Automation error: {0}")]
    AutomationError(String),

    /// Unknown/unexpected error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::SystemIO(err.to_string())
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        CommandError::InvalidInput(format!("JSON error: {}", err))
    }
}

impl From<tauri::Error> for CommandError {
    fn from(err: tauri::Error) -> Self {
        CommandError::WindowError(err.to_string())
    }
}

/// Helper type alias for command results
pub type CommandResult<T> = Result<T, CommandError>;
