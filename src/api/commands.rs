//! Tauri command handlers, grouped by concern
//!
//! - `clipboard`: history reads, promotion, clipboard writes, paste
//! - `window`: popup visibility and sizing
//! - `settings`: tray visibility and shortcut
//! - `system`: permissions and watcher diagnostics

pub mod clipboard;
pub mod settings;
pub mod system;
pub mod window;
