//! Runtime configuration
//!
//! Centralized constants and tunables for the watcher, the history store and
//! the popup window.

use std::time::Duration;

/// Maximum number of entries the history keeps
pub const MAX_HISTORY: usize = 10;

/// File name of the persisted key-value store (resolved by tauri-plugin-store)
pub const STORE_FILE: &str = "store.json";

/// Watcher executable expected next to the host executable
pub const WATCHER_BINARY: &str = "clipboard-watcher";

/// Line the watcher writes to stdout for every detected change
pub const SIGNAL_TOKEN: &str = "clipboard-changed";

/// Environment override for the watcher's poll interval
pub const POLL_INTERVAL_ENV: &str = "MACOPY_POLL_INTERVAL_MS";

/// Persisted store keys
pub mod keys {
    pub const HISTORY: &str = "history";
    pub const SHORTCUT: &str = "shortcut";
    pub const SHOW_TRAY_ICON: &str = "showTrayIcon";
}

/// Label of the popup webview window (tauri.conf.json)
pub const POPUP_WINDOW_LABEL: &str = "main";

/// Change detector cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Pause between a copy/cut chord and the confirming sample
    pub settle_delay: Duration,
    /// Unconditional sampling period
    pub poll_interval: Duration,
}

impl DetectorConfig {
    /// Watcher process: chord hook plus a 1 second fallback poll
    pub fn watcher() -> Self {
        Self {
            settle_delay: Duration::from_millis(50),
            poll_interval: Duration::from_secs(1),
        }
    }

    /// Host safety net: polling only
    pub fn host() -> Self {
        Self {
            settle_delay: Duration::from_millis(50),
            poll_interval: Duration::from_secs(1),
        }
    }

    /// Watcher defaults with `MACOPY_POLL_INTERVAL_MS` applied when it parses
    pub fn watcher_from_env() -> Self {
        let mut config = Self::watcher();
        if let Ok(raw) = std::env::var(POLL_INTERVAL_ENV) {
            match parse_poll_interval(&raw) {
                Some(interval) => config.poll_interval = interval,
                None => log::warn!("Ignoring invalid {}={:?}", POLL_INTERVAL_ENV, raw),
            }
        }
        config
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::watcher()
    }
}

fn parse_poll_interval(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Some(Duration::from_millis(ms)),
        _ => None,
    }
}

/// Popup window geometry, logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupConfig {
    pub width: f64,
    pub row_height: f64,
    pub header_height: f64,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            width: 250.0,
            row_height: 36.0,
            header_height: 12.0,
        }
    }
}
