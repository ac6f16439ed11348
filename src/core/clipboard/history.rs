use crate::config::{keys, MAX_HISTORY};
use crate::core::clipboard::source::ClipboardSource;
use crate::shared::errors::{CommandError, CommandResult};
use crate::shared::store::KeyValueStore;
use crate::shared::types::HistoryEntry;
use serde::Serialize;
use std::collections::VecDeque;

/// Immutable copy of the history handed to the UI and the tray menu
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySnapshot {
    pub version: u64,
    pub entries: Vec<HistoryEntry>,
}

impl HistorySnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bounded, most-recent-first clipboard history.
///
/// Only the head is checked for duplicates; an older identical entry further
/// back stays where it is.
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: VecDeque<HistoryEntry>,
    version: u64,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted entries, most recent first. Extra entries are dropped.
    ///
    /// `version` is not persisted and restarts at 0, so versions only order
    /// snapshots within one run of the host.
    pub fn from_entries(entries: impl IntoIterator<Item = HistoryEntry>) -> Self {
        Self {
            entries: entries.into_iter().take(MAX_HISTORY).collect(),
            version: 0,
        }
    }

    /// Load the `history` key. Records that do not parse are skipped.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(value) = store.get(keys::HISTORY) else {
            return Self::new();
        };

        let records = match serde_json::from_value::<Vec<serde_json::Value>>(value) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("[HistoryStore] Persisted history is not a list, starting fresh: {}", e);
                return Self::new();
            }
        };

        let total = records.len();
        let entries: Vec<HistoryEntry> = records
            .into_iter()
            .filter_map(|record| serde_json::from_value(record).ok())
            .collect();
        if entries.len() != total {
            log::warn!(
                "[HistoryStore] Skipped {} malformed history records",
                total - entries.len()
            );
        }

        let history = Self::from_entries(entries);
        log::info!("[HistoryStore] Loaded {} entries", history.len());
        history
    }

    /// Write the `history` key and save the store
    pub fn flush(&self, store: &dyn KeyValueStore) -> CommandResult<()> {
        let value = serde_json::to_value(&self.entries)?;
        store.set(keys::HISTORY, value);
        store.save()
    }

    /// Read the clipboard and record it unless it matches the head.
    ///
    /// A non-empty image wins over text. Read failures are logged and treated
    /// as "nothing new"; the next signal retries.
    pub fn apply_change(&mut self, clipboard: &dyn ClipboardSource) -> Option<HistoryEntry> {
        let candidate = match read_candidate(clipboard) {
            Ok(Some(candidate)) => candidate,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("[HistoryStore] Failed to read clipboard: {}", e);
                return None;
            }
        };
        self.insert(candidate)
    }

    /// Prepend `candidate` unless it equals the head. Returns the inserted entry.
    pub fn insert(&mut self, candidate: HistoryEntry) -> Option<HistoryEntry> {
        if self.entries.front() == Some(&candidate) {
            return None;
        }

        self.entries.push_front(candidate.clone());
        while self.entries.len() > MAX_HISTORY {
            self.entries.pop_back();
        }
        self.version += 1;
        Some(candidate)
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            version: self.version,
            entries: self.entries.iter().cloned().collect(),
        }
    }

    /// Write the entry at `index` back to the clipboard.
    ///
    /// The store itself is not touched; the change signal that follows the
    /// write is absorbed by the head check.
    pub fn promote(&self, index: usize, clipboard: &dyn ClipboardSource) -> CommandResult<HistoryEntry> {
        let entry = self
            .entries
            .get(index)
            .cloned()
            .ok_or(CommandError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })?;

        match &entry {
            HistoryEntry::Text(content) => clipboard.write_text(content)?,
            HistoryEntry::Image(data_url) => clipboard.write_image(data_url)?,
        }
        Ok(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

fn read_candidate(clipboard: &dyn ClipboardSource) -> CommandResult<Option<HistoryEntry>> {
    if let Some(image) = clipboard.read_image()? {
        if !image.is_empty() {
            return Ok(Some(HistoryEntry::Image(image)));
        }
    }

    Ok(clipboard
        .read_text()?
        .filter(|text| !text.is_empty())
        .map(HistoryEntry::Text))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::shared::store::MemoryStore;
    use std::sync::Mutex;

    /// In-memory pasteboard with one text and one image slot
    #[derive(Default)]
    pub(crate) struct FakeClipboard {
        pub text: Mutex<Option<String>>,
        pub image: Mutex<Option<String>>,
        pub fail_reads: Mutex<bool>,
    }

    impl FakeClipboard {
        pub fn with_text(text: &str) -> Self {
            let clipboard = Self::default();
            clipboard.copy_text(text);
            clipboard
        }

        pub fn copy_text(&self, text: &str) {
            *self.image.lock().unwrap() = None;
            *self.text.lock().unwrap() = Some(text.to_string());
        }

        pub fn copy_image(&self, data_url: &str) {
            *self.text.lock().unwrap() = None;
            *self.image.lock().unwrap() = Some(data_url.to_string());
        }
    }

    impl ClipboardSource for FakeClipboard {
        fn read_image(&self) -> CommandResult<Option<String>> {
            if *self.fail_reads.lock().unwrap() {
                return Err(CommandError::ClipboardError("pasteboard unavailable".to_string()));
            }
            Ok(self.image.lock().unwrap().clone())
        }

        fn read_text(&self) -> CommandResult<Option<String>> {
            if *self.fail_reads.lock().unwrap() {
                return Err(CommandError::ClipboardError("pasteboard unavailable".to_string()));
            }
            Ok(self.text.lock().unwrap().clone())
        }

        fn write_text(&self, text: &str) -> CommandResult<()> {
            self.copy_text(text);
            Ok(())
        }

        fn write_image(&self, data_url: &str) -> CommandResult<()> {
            self.copy_image(data_url);
            Ok(())
        }
    }

    fn text(content: &str) -> HistoryEntry {
        HistoryEntry::Text(content.to_string())
    }

    #[test]
    fn test_apply_change_prepends() {
        let clipboard = FakeClipboard::with_text("First item");
        let mut history = HistoryStore::new();

        assert_eq!(history.apply_change(&clipboard), Some(text("First item")));
        clipboard.copy_text("Second item");
        assert_eq!(history.apply_change(&clipboard), Some(text("Second item")));

        let snapshot = history.snapshot();
        assert_eq!(snapshot.entries, vec![text("Second item"), text("First item")]);
        assert_eq!(snapshot.version, 2);
    }

    #[test]
    fn test_head_duplicate_is_noop() {
        let clipboard = FakeClipboard::with_text("Same content");
        let mut history = HistoryStore::new();

        history.apply_change(&clipboard);
        let before = history.snapshot();

        assert_eq!(history.apply_change(&clipboard), None);
        assert_eq!(history.snapshot(), before);
    }

    #[test]
    fn test_older_duplicate_is_kept() {
        let mut history = HistoryStore::new();
        history.insert(text("a"));
        history.insert(text("b"));
        assert_eq!(history.insert(text("a")), Some(text("a")));
        assert_eq!(history.snapshot().entries, vec![text("a"), text("b"), text("a")]);
    }

    #[test]
    fn test_eleven_entries_evict_oldest() {
        let mut history = HistoryStore::new();
        for i in 0..11 {
            history.insert(text(&format!("Item {}", i)));
        }

        let entries = history.snapshot().entries;
        assert_eq!(entries.len(), MAX_HISTORY);
        assert_eq!(entries[0], text("Item 10"));
        assert_eq!(entries[9], text("Item 1"));
        assert!(!entries.contains(&text("Item 0")));
    }

    #[test]
    fn test_length_never_exceeds_max() {
        let clipboard = FakeClipboard::default();
        let mut history = HistoryStore::new();
        for i in 0..40 {
            // repeats every third step exercise the head check too
            clipboard.copy_text(&format!("entry {}", i / 3));
            history.apply_change(&clipboard);
            assert!(history.snapshot().len() <= MAX_HISTORY);
        }
    }

    #[test]
    fn test_image_takes_precedence() {
        let clipboard = FakeClipboard::with_text("caption");
        *clipboard.image.lock().unwrap() = Some("data:image/png;base64,iVBO".to_string());

        let mut history = HistoryStore::new();
        let inserted = history.apply_change(&clipboard).unwrap();
        assert!(inserted.is_image());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_empty_image_falls_back_to_text() {
        let clipboard = FakeClipboard::with_text("caption");
        *clipboard.image.lock().unwrap() = Some(String::new());

        let mut history = HistoryStore::new();
        assert_eq!(history.apply_change(&clipboard), Some(text("caption")));
    }

    #[test]
    fn test_empty_clipboard_is_noop() {
        let clipboard = FakeClipboard::with_text("");
        let mut history = HistoryStore::new();
        assert_eq!(history.apply_change(&clipboard), None);
        assert!(history.is_empty());
    }

    #[test]
    fn test_read_failure_is_absorbed() {
        let clipboard = FakeClipboard::with_text("x");
        *clipboard.fail_reads.lock().unwrap() = true;

        let mut history = HistoryStore::new();
        assert_eq!(history.apply_change(&clipboard), None);

        *clipboard.fail_reads.lock().unwrap() = false;
        assert_eq!(history.apply_change(&clipboard), Some(text("x")));
    }

    #[test]
    fn test_promote_writes_clipboard() {
        let clipboard = FakeClipboard::default();
        let mut history = HistoryStore::new();
        history.insert(text("old"));
        history.insert(HistoryEntry::Image("data:image/png;base64,AAAA".to_string()));
        history.insert(text("new"));

        let promoted = history.promote(1, &clipboard).unwrap();
        assert!(promoted.is_image());
        assert_eq!(
            clipboard.image.lock().unwrap().as_deref(),
            Some("data:image/png;base64,AAAA")
        );

        history.promote(2, &clipboard).unwrap();
        assert_eq!(clipboard.text.lock().unwrap().as_deref(), Some("old"));
    }

    #[test]
    fn test_promote_out_of_range() {
        let clipboard = FakeClipboard::with_text("untouched");
        let mut history = HistoryStore::new();
        history.insert(text("only"));
        let before = history.snapshot();

        let err = history.promote(1, &clipboard).unwrap_err();
        assert_eq!(err, CommandError::IndexOutOfRange { index: 1, len: 1 });
        assert_eq!(history.snapshot(), before);
        assert_eq!(clipboard.text.lock().unwrap().as_deref(), Some("untouched"));
    }

    #[test]
    fn test_persist_roundtrip() {
        let store = MemoryStore::new();
        let mut history = HistoryStore::new();
        history.insert(text("kept"));
        history.insert(HistoryEntry::Image("data:image/png;base64,AAAA".to_string()));
        history.flush(&store).unwrap();

        let loaded = HistoryStore::load(&store);
        assert_eq!(loaded.snapshot().entries, history.snapshot().entries);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_loaded_history_versions_restart() {
        let store = MemoryStore::new();
        let mut history = HistoryStore::new();
        history.insert(text("one"));
        history.insert(text("two"));
        history.flush(&store).unwrap();
        assert_eq!(history.version(), 2);

        let mut loaded = HistoryStore::load(&store);
        assert_eq!(loaded.version(), 0);
        loaded.insert(text("three"));
        assert_eq!(loaded.snapshot().version, 1);
    }

    #[test]
    fn test_load_skips_malformed_records() {
        let store = MemoryStore::new();
        store.set(
            keys::HISTORY,
            serde_json::json!([
                {"type": "text", "content": "good"},
                {"type": "video", "content": "nope"},
                {"content": "missing kind"},
                {"type": "image", "content": "data:image/png;base64,AAAA"}
            ]),
        );

        let loaded = HistoryStore::load(&store);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.snapshot().entries[0], text("good"));
    }

    #[test]
    fn test_load_truncates_to_max() {
        let store = MemoryStore::new();
        let records: Vec<_> = (0..15)
            .map(|i| serde_json::json!({"type": "text", "content": format!("{}", i)}))
            .collect();
        store.set(keys::HISTORY, serde_json::Value::Array(records));

        let loaded = HistoryStore::load(&store);
        assert_eq!(loaded.len(), MAX_HISTORY);
        assert_eq!(loaded.snapshot().entries[0], text("0"));
    }

    #[test]
    fn test_load_non_list_starts_fresh() {
        let store = MemoryStore::new();
        store.set(keys::HISTORY, serde_json::json!("corrupted"));
        assert!(HistoryStore::load(&store).is_empty());
    }
}
