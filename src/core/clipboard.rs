//! Clipboard history
//!
//! - `source`: traits over the OS pasteboard
//! - `detector`: turns generation changes into watcher signals
//! - `history`: bounded most-recent-first store with head dedup
//! - `fanout`: pushes snapshots to the UI and the tray
//! - `service`: glues the above together for the host process

pub mod detector;
pub mod fanout;
pub mod history;
pub mod service;
pub mod source;

pub use detector::{is_copy_chord, ChangeDetector, DetectorTrigger};
pub use fanout::{HistoryObserver, NotificationFanout};
pub use history::{HistorySnapshot, HistoryStore};
pub use service::HistoryService;
pub use source::{ClipboardSource, Generation, GenerationProbe};
