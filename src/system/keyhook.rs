//! Copy/cut chord detection for the watcher process

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "macos")]
pub use macos::run_copy_chord_monitor;
