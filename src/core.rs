//! Platform-independent logic: history, change detection, watcher protocol,
//! popup placement and shortcut bindings

pub mod clipboard;
pub mod placement;
pub mod shortcut;
pub mod watcher;
