use crate::core::clipboard::fanout::{HistoryObserver, NotificationFanout};
use crate::core::clipboard::history::{HistorySnapshot, HistoryStore};
use crate::core::clipboard::source::ClipboardSource;
use crate::shared::errors::CommandResult;
use crate::shared::store::KeyValueStore;
use crate::shared::types::{HistoryEntry, WatcherSignal};
use std::sync::{Arc, Mutex, MutexGuard};

/// Owns the history and wires it to the clipboard, the persisted store and
/// the observers. Managed as Tauri state.
pub struct HistoryService {
    history: Mutex<HistoryStore>,
    clipboard: Arc<dyn ClipboardSource>,
    persistence: Arc<dyn KeyValueStore>,
    fanout: NotificationFanout,
}

impl HistoryService {
    pub fn new(
        history: HistoryStore,
        clipboard: Arc<dyn ClipboardSource>,
        persistence: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            history: Mutex::new(history),
            clipboard,
            persistence,
            fanout: NotificationFanout::new(),
        }
    }

    /// Load persisted history and build the service around it
    pub fn load(clipboard: Arc<dyn ClipboardSource>, persistence: Arc<dyn KeyValueStore>) -> Self {
        let history = HistoryStore::load(persistence.as_ref());
        Self::new(history, clipboard, persistence)
    }

    pub fn subscribe(&self, observer: Arc<dyn HistoryObserver>) {
        self.fanout.subscribe(observer);
    }

    fn lock(&self) -> MutexGuard<'_, HistoryStore> {
        match self.history.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("[HistoryService] Mutex poisoned, recovering...");
                poisoned.into_inner()
            }
        }
    }

    /// Re-read the clipboard after a watcher signal. When something new was
    /// recorded, persist it and publish the resulting snapshot.
    ///
    /// Observers run after the history lock is released. The tray observer
    /// waits on the main thread, which itself takes this lock on exit.
    pub fn handle_signal(&self, _signal: WatcherSignal) -> Option<HistoryEntry> {
        let (inserted, snapshot) = {
            let mut history = self.lock();
            let inserted = history.apply_change(self.clipboard.as_ref())?;
            if let Err(e) = history.flush(self.persistence.as_ref()) {
                log::error!("[HistoryService] Failed to persist history: {}", e);
            }
            (inserted, history.snapshot())
        };

        log::info!(
            "[HistoryService] Recorded {} entry ({} total)",
            if inserted.is_image() { "image" } else { "text" },
            snapshot.len()
        );
        self.fanout.publish(&snapshot);
        Some(inserted)
    }

    /// Pick up any unreported change before the popup opens. Returns the
    /// snapshot to show when nothing was published, `None` when the change
    /// already went out through the observers.
    pub fn refresh_unpublished(&self) -> Option<HistorySnapshot> {
        match self.handle_signal(WatcherSignal) {
            Some(_) => None,
            None => Some(self.snapshot()),
        }
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        self.lock().snapshot()
    }

    /// Put entry `index` back on the clipboard. The store is left alone.
    pub fn promote(&self, index: usize) -> CommandResult<HistoryEntry> {
        let history = self.lock();
        let entry = history.promote(index, self.clipboard.as_ref())?;
        log::info!("[HistoryService] Promoted entry {}", index);
        Ok(entry)
    }

    /// Republish the current snapshot, e.g. after the tray is rebuilt
    pub fn refresh_observers(&self) {
        let snapshot = self.snapshot();
        self.fanout.publish(&snapshot);
    }

    pub fn flush(&self) -> CommandResult<()> {
        self.lock().flush(self.persistence.as_ref())
    }

    pub fn clipboard(&self) -> &dyn ClipboardSource {
        self.clipboard.as_ref()
    }

    /// Store shared with the settings
    pub fn persistence(&self) -> &dyn KeyValueStore {
        self.persistence.as_ref()
    }
}
