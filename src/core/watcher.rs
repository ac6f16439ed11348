//! Out-of-process clipboard watcher: wire format and host-side supervision

pub mod protocol;
pub mod supervisor;

pub use protocol::{parse_line, write_signal, LineKind};
pub use supervisor::{locate_watcher, supervise, SharedWatcherStatus, WatcherStatus};
