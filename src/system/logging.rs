//! Log setup for both binaries
//!
//! The host logs through tauri-plugin-log. The watcher has no Tauri runtime
//! and its stdout is the signal channel, so it logs to stderr through
//! tracing-subscriber, which also picks up `log` records.

use log::LevelFilter;
use tauri_plugin_log::{Target, TargetKind, TimezoneStrategy};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE: &str = "macopy";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// tauri-plugin-log builder for the host process
pub fn host_builder() -> tauri_plugin_log::Builder {
    let is_dev = cfg!(debug_assertions);
    let level = if is_dev {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let builder = tauri_plugin_log::Builder::new()
        .clear_targets()
        .timezone_strategy(TimezoneStrategy::UseLocal)
        .level(level)
        .format(|out, message, record| {
            // 2025-12-29 10:30:45.123 INFO [history.rs:34] [macopy_lib::core::clipboard::history] message
            out.finish(format_args!(
                "{} {} [{}:{}] [{}] {}",
                chrono::Local::now().format(TIMESTAMP_FORMAT),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.target(),
                message
            ))
        })
        .target(Target::new(TargetKind::Stdout));

    if is_dev {
        builder.target(Target::new(TargetKind::Webview))
    } else {
        builder.target(Target::new(TargetKind::LogDir {
            file_name: Some(LOG_FILE.to_string()),
        }))
    }
}

fn default_watcher_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// stderr subscriber for the watcher process. `RUST_LOG` overrides the filter.
pub fn init_watcher_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_watcher_filter()));

    let stderr_layer = fmt::layer()
        .with_timer(fmt::time::ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_level(true)
        .with_target(true)
        .with_ansi(false)
        .with_writer(std::io::stderr);

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
    {
        eprintln!("Failed to initialize watcher logging: {}", e);
    }
}
