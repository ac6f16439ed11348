use crate::core::clipboard::history::HistorySnapshot;
use std::sync::{Arc, Mutex, RwLock};

/// Receives every published history snapshot (popup UI, tray menu)
pub trait HistoryObserver: Send + Sync {
    fn name(&self) -> &'static str;
    fn on_snapshot(&self, snapshot: &HistorySnapshot);
}

/// Delivers each snapshot to every subscriber, in subscription order.
///
/// Publishing is serialized and never goes backwards: a snapshot older than
/// the last one delivered is dropped. Republishing the same version is
/// allowed. Callers publish after releasing the history lock.
#[derive(Default)]
pub struct NotificationFanout {
    observers: RwLock<Vec<Arc<dyn HistoryObserver>>>,
    delivered: Mutex<Option<u64>>,
}

impl NotificationFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: Arc<dyn HistoryObserver>) {
        let mut observers = match self.observers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        log::debug!("[Fanout] Subscribed {}", observer.name());
        observers.push(observer);
    }

    /// Deliver `snapshot` unless a newer version already went out. Returns
    /// whether it was delivered.
    pub fn publish(&self, snapshot: &HistorySnapshot) -> bool {
        let mut delivered = match self.delivered.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if matches!(*delivered, Some(last) if snapshot.version < last) {
            log::debug!(
                "[Fanout] Dropped stale snapshot v{} (delivered v{:?})",
                snapshot.version,
                *delivered
            );
            return false;
        }

        let observers = match self.observers.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for observer in observers.iter() {
            observer.on_snapshot(snapshot);
        }
        *delivered = Some(snapshot.version);
        true
    }

    pub fn len(&self) -> usize {
        match self.observers.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::shared::types::HistoryEntry;

    /// Keeps the versions it was handed
    #[derive(Default)]
    pub(crate) struct RecordingObserver {
        pub seen: Mutex<Vec<HistorySnapshot>>,
    }

    impl RecordingObserver {
        pub fn versions(&self) -> Vec<u64> {
            self.seen.lock().unwrap().iter().map(|s| s.version).collect()
        }
    }

    impl HistoryObserver for RecordingObserver {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn on_snapshot(&self, snapshot: &HistorySnapshot) {
            self.seen.lock().unwrap().push(snapshot.clone());
        }
    }

    fn snapshot(version: u64) -> HistorySnapshot {
        HistorySnapshot {
            version,
            entries: vec![HistoryEntry::Text(format!("v{}", version))],
        }
    }

    #[test]
    fn test_every_observer_sees_every_snapshot() {
        let fanout = NotificationFanout::new();
        let ui = Arc::new(RecordingObserver::default());
        let tray = Arc::new(RecordingObserver::default());
        fanout.subscribe(ui.clone());
        fanout.subscribe(tray.clone());

        fanout.publish(&snapshot(1));
        fanout.publish(&snapshot(2));

        assert_eq!(ui.versions(), vec![1, 2]);
        assert_eq!(tray.versions(), vec![1, 2]);
        assert_eq!(fanout.len(), 2);
    }

    #[test]
    fn test_stale_snapshot_is_dropped() {
        let fanout = NotificationFanout::new();
        let ui = Arc::new(RecordingObserver::default());
        fanout.subscribe(ui.clone());

        assert!(fanout.publish(&snapshot(2)));
        assert!(!fanout.publish(&snapshot(1)));
        // same version again, e.g. after a settings change
        assert!(fanout.publish(&snapshot(2)));
        assert_eq!(ui.versions(), vec![2, 2]);
    }

    #[test]
    fn test_publish_without_observers() {
        let fanout = NotificationFanout::new();
        assert!(fanout.is_empty());
        assert!(fanout.publish(&snapshot(1)));
    }
}
