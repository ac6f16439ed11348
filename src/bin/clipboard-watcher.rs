//! Out-of-process clipboard watcher
//!
//! Prints `clipboard-changed` on stdout for every clipboard change and logs to
//! stderr. On macOS the main thread runs the AppKit loop for the ⌘C / ⌘X
//! monitor while the detector runs on a worker thread. Exits when stdin or
//! stdout is closed.

use macopy_lib::config::DetectorConfig;
use macopy_lib::core::clipboard::{ChangeDetector, DetectorTrigger};
use macopy_lib::core::watcher::write_signal;
use macopy_lib::system::clipboard::PasteboardProbe;
use macopy_lib::system::logging::init_watcher_logging;
use std::io::Read;
use tokio::sync::mpsc;

fn main() {
    init_watcher_logging();

    let config = DetectorConfig::watcher_from_env();
    let (trigger_tx, trigger_rx) = mpsc::unbounded_channel::<DetectorTrigger>();

    if let Err(e) = std::thread::Builder::new()
        .name("stdin-watch".to_string())
        .spawn(exit_on_stdin_close)
    {
        log::warn!("Could not watch stdin: {}", e);
    }

    let detector = match std::thread::Builder::new()
        .name("detector".to_string())
        .spawn(move || run_detector(config, trigger_rx))
    {
        Ok(handle) => handle,
        Err(e) => {
            log::error!("Failed to start detector thread: {}", e);
            std::process::exit(1);
        }
    };

    #[cfg(target_os = "macos")]
    {
        let _ = detector;
        macopy_lib::system::keyhook::run_copy_chord_monitor(trigger_tx);
    }

    #[cfg(not(target_os = "macos"))]
    {
        // polling only
        drop(trigger_tx);
        if detector.join().is_err() {
            log::error!("Detector thread panicked");
            std::process::exit(1);
        }
    }
}

/// The host holds our stdin open; EOF means it is gone
fn exit_on_stdin_close() {
    let mut stdin = std::io::stdin();
    let mut buf = [0u8; 256];
    loop {
        match stdin.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
    }
    log::info!("stdin closed, exiting");
    std::process::exit(0);
}

fn run_detector(config: DetectorConfig, triggers: mpsc::UnboundedReceiver<DetectorTrigger>) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Failed to build runtime: {}", e);
            std::process::exit(1);
        }
    };

    runtime.block_on(async move {
        let (signal_tx, mut signal_rx) = mpsc::unbounded_channel();
        let detector = ChangeDetector::new(PasteboardProbe);
        let detector_task = tokio::spawn(detector.run(config, triggers, signal_tx));

        let mut stdout = std::io::stdout();
        while signal_rx.recv().await.is_some() {
            if let Err(e) = write_signal(&mut stdout) {
                log::info!("stdout closed ({}), exiting", e);
                break;
            }
            log::debug!("Signalled clipboard change");
        }

        drop(signal_rx);
        let _ = detector_task.await;
    });

    std::process::exit(0);
}
