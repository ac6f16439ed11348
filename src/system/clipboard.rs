//! OS clipboard adapters
//!
//! [`NativeClipboard`] talks to NSPasteboard on macOS and to `cli-clipboard`
//! elsewhere (text only). [`HostClipboard`] routes text through
//! tauri-plugin-clipboard-manager and images through the native pasteboard.

#[cfg(target_os = "macos")]
mod macos;

use crate::core::clipboard::source::{ClipboardSource, Generation, GenerationProbe};
use crate::shared::errors::{CommandError, CommandResult};
use crate::shared::types::PNG_DATA_URL_PREFIX;
use base64::Engine;
use tauri::{AppHandle, Runtime};
use tauri_plugin_clipboard_manager::ClipboardExt;

pub fn encode_png_data_url(png: &[u8]) -> String {
    format!(
        "{}{}",
        PNG_DATA_URL_PREFIX,
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

pub fn decode_png_data_url(data_url: &str) -> CommandResult<Vec<u8>> {
    let payload = data_url.strip_prefix(PNG_DATA_URL_PREFIX).ok_or_else(|| {
        CommandError::InvalidInput("Expected a data:image/png;base64 URL".to_string())
    })?;
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| CommandError::InvalidInput(format!("Invalid base64 image data: {}", e)))
}

/// Direct pasteboard access, usable without a Tauri app (watcher process)
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeClipboard;

#[cfg(target_os = "macos")]
impl ClipboardSource for NativeClipboard {
    fn read_image(&self) -> CommandResult<Option<String>> {
        Ok(macos::read_png()
            .filter(|png| !png.is_empty())
            .map(|png| encode_png_data_url(&png)))
    }

    fn read_text(&self) -> CommandResult<Option<String>> {
        Ok(macos::read_text())
    }

    fn write_text(&self, text: &str) -> CommandResult<()> {
        if macos::write_text(text) {
            Ok(())
        } else {
            Err(CommandError::ClipboardError("NSPasteboard rejected text".to_string()))
        }
    }

    fn write_image(&self, data_url: &str) -> CommandResult<()> {
        let png = decode_png_data_url(data_url)?;
        if macos::write_png(&png) {
            Ok(())
        } else {
            Err(CommandError::ClipboardError("NSPasteboard rejected image".to_string()))
        }
    }
}

#[cfg(not(target_os = "macos"))]
impl ClipboardSource for NativeClipboard {
    fn read_image(&self) -> CommandResult<Option<String>> {
        Ok(None)
    }

    fn read_text(&self) -> CommandResult<Option<String>> {
        use cli_clipboard::{ClipboardContext, ClipboardProvider};
        let text = ClipboardContext::new()
            .and_then(|mut ctx| ctx.get_contents())
            .map_err(|e| CommandError::ClipboardError(e.to_string()))?;
        Ok(Some(text))
    }

    fn write_text(&self, text: &str) -> CommandResult<()> {
        use cli_clipboard::{ClipboardContext, ClipboardProvider};
        ClipboardContext::new()
            .and_then(|mut ctx| ctx.set_contents(text.to_string()))
            .map_err(|e| CommandError::ClipboardError(e.to_string()))
    }

    fn write_image(&self, _data_url: &str) -> CommandResult<()> {
        Err(CommandError::ClipboardError(
            "Image clipboard is not supported on this platform".to_string(),
        ))
    }
}

/// NSPasteboard `changeCount` on macOS, a digest of the text elsewhere
#[derive(Debug, Default)]
pub struct PasteboardProbe;

impl GenerationProbe for PasteboardProbe {
    #[cfg(target_os = "macos")]
    fn generation(&mut self) -> CommandResult<Generation> {
        Ok(Generation(macos::change_count() as u64))
    }

    #[cfg(not(target_os = "macos"))]
    fn generation(&mut self) -> CommandResult<Generation> {
        let text = NativeClipboard.read_text()?.unwrap_or_default();
        Ok(Generation::of_content(text.as_bytes()))
    }
}

/// Clipboard used by the host process
pub struct HostClipboard<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> HostClipboard<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: Runtime> ClipboardSource for HostClipboard<R> {
    fn read_image(&self) -> CommandResult<Option<String>> {
        NativeClipboard.read_image()
    }

    fn read_text(&self) -> CommandResult<Option<String>> {
        self.app
            .clipboard()
            .read_text()
            .map(Some)
            .map_err(|e| CommandError::ClipboardError(e.to_string()))
    }

    fn write_text(&self, text: &str) -> CommandResult<()> {
        self.app
            .clipboard()
            .write_text(text.to_string())
            .map_err(|e| CommandError::ClipboardError(e.to_string()))
    }

    fn write_image(&self, data_url: &str) -> CommandResult<()> {
        NativeClipboard.write_image(data_url)
    }
}
