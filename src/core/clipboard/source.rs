//! Seam over the OS clipboard.
//!
//! The host and the watcher process both talk to the pasteboard through these
//! traits so the store and the detector can be exercised without one.

use crate::shared::errors::CommandResult;

/// Opaque clipboard generation: NSPasteboard `changeCount` on macOS, a digest
/// of the current content elsewhere. Only compared for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Generation(pub u64);

impl Generation {
    /// Fold an MD5 digest of `content` into a generation
    pub fn of_content(content: &[u8]) -> Self {
        let digest = md5::compute(content);
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.0[..8]);
        Generation(u64::from_le_bytes(head))
    }
}

/// Something that can report the clipboard generation
pub trait GenerationProbe: Send {
    fn generation(&mut self) -> CommandResult<Generation>;
}

/// Full read/write access used by the history store
pub trait ClipboardSource: Send + Sync {
    /// PNG data URL of the image slot, `None` when no image is present
    fn read_image(&self) -> CommandResult<Option<String>>;

    /// Text slot, `None` when no text is present
    fn read_text(&self) -> CommandResult<Option<String>>;

    fn write_text(&self, text: &str) -> CommandResult<()>;

    /// Write a PNG data URL to the image slot
    fn write_image(&self, data_url: &str) -> CommandResult<()>;
}
