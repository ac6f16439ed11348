use crate::config::WATCHER_BINARY;
use crate::core::watcher::protocol::{parse_line, LineKind};
use crate::shared::types::WatcherSignal;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Lifecycle of the watcher child, kept for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum WatcherStatus {
    #[default]
    NotStarted,
    /// Binary absent or could not be spawned
    Missing,
    Running { pid: Option<u32> },
    Exited { code: Option<i32> },
}

pub type SharedWatcherStatus = Arc<Mutex<WatcherStatus>>;

fn set_status(status: &SharedWatcherStatus, next: WatcherStatus) {
    let mut guard = match status.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = next;
}

/// `clipboard-watcher` next to the running executable
pub fn locate_watcher() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let name = format!("{}{}", WATCHER_BINARY, std::env::consts::EXE_SUFFIX);
    Some(exe.parent()?.join(name))
}

/// Spawn the watcher and forward its signals until it exits.
///
/// The watcher is never restarted; the host's own poll detector covers for
/// it. Returns the final status, which is also written to `status`.
pub async fn supervise(
    program: &Path,
    args: &[&str],
    signals: mpsc::UnboundedSender<WatcherSignal>,
    status: SharedWatcherStatus,
) -> WatcherStatus {
    if !program.exists() {
        log::warn!(
            "[Watcher] {} not found, relying on in-process polling",
            program.display()
        );
        set_status(&status, WatcherStatus::Missing);
        return WatcherStatus::Missing;
    }

    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            log::warn!(
                "[Watcher] Failed to spawn {}: {}, relying on in-process polling",
                program.display(),
                e
            );
            set_status(&status, WatcherStatus::Missing);
            return WatcherStatus::Missing;
        }
    };

    // The watcher exits when this pipe closes, including when the host dies
    let _stdin = child.stdin.take();

    let pid = child.id();
    log::info!("[Watcher] Started (pid {:?})", pid);
    set_status(&status, WatcherStatus::Running { pid });

    let diagnostics = child
        .stderr
        .take()
        .map(|stderr| tokio::spawn(pump_diagnostics(BufReader::new(stderr))));

    if let Some(stdout) = child.stdout.take() {
        let forwarded = pump_signal_lines(BufReader::new(stdout), &signals).await;
        log::debug!("[Watcher] Forwarded {} signals", forwarded);
    }

    if signals.is_closed() {
        if let Err(e) = child.kill().await {
            log::debug!("[Watcher] Kill after shutdown failed: {}", e);
        }
    }

    let code = match child.wait().await {
        Ok(exit) => exit.code(),
        Err(e) => {
            log::warn!("[Watcher] Failed to collect exit status: {}", e);
            None
        }
    };
    if let Some(diagnostics) = diagnostics {
        let _ = diagnostics.await;
    }

    log::warn!(
        "[Watcher] Exited with code {:?}, continuing with in-process polling",
        code
    );
    let exited = WatcherStatus::Exited { code };
    set_status(&status, exited);
    exited
}

/// Forward one signal per token line. Stops at EOF, on a read error or when
/// nobody is listening anymore. Returns the number of signals forwarded.
pub async fn pump_signal_lines<R>(reader: R, signals: &mpsc::UnboundedSender<WatcherSignal>) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_line(&line) {
                LineKind::Signal => {
                    if signals.send(WatcherSignal).is_err() {
                        break;
                    }
                    forwarded += 1;
                }
                LineKind::Diagnostic(text) => log::debug!("[Watcher] {}", text),
                LineKind::Blank => {}
            },
            Ok(None) => break,
            Err(e) => {
                log::warn!("[Watcher] Failed to read stdout: {}", e);
                break;
            }
        }
    }

    forwarded
}

async fn pump_diagnostics<R>(reader: R)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if !line.is_empty() {
            log::warn!("[Watcher] {}", line);
        }
    }
}
