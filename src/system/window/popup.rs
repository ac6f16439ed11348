//! Popup window: show at the cursor, hide, resize to the measured height

use crate::config::{PopupConfig, POPUP_WINDOW_LABEL};
use crate::core::placement::{compute_popup_position, estimate_popup_height, nearest_work_area};
use crate::shared::errors::{CommandError, CommandResult};
use crate::shared::types::{CursorPosition, PopupSize, WindowPosition, WorkArea};
use std::sync::Mutex;
use tauri::{AppHandle, LogicalPosition, LogicalSize, Manager, Runtime, WebviewWindow};

/// Where the visible popup was opened
#[derive(Debug, Clone, Copy, PartialEq)]
struct Anchor {
    cursor: CursorPosition,
    area: Option<WorkArea>,
}

/// Popup geometry remembered between shows
pub struct PopupState {
    config: PopupConfig,
    measured_height: Mutex<Option<f64>>,
    anchor: Mutex<Option<Anchor>>,
}

impl PopupState {
    pub fn new(config: PopupConfig) -> Self {
        Self {
            config,
            measured_height: Mutex::new(None),
            anchor: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &PopupConfig {
        &self.config
    }

    /// Height last reported by the UI
    pub fn measured_height(&self) -> Option<f64> {
        match self.measured_height.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set_measured_height(&self, height: f64) -> CommandResult<()> {
        if !height.is_finite() || height <= 0.0 {
            return Err(CommandError::InvalidInput(format!(
                "Window height must be positive, got {}",
                height
            )));
        }
        let mut guard = match self.measured_height.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(height);
        Ok(())
    }

    /// Size for `entries` rows. A measurement taken with fewer rows never
    /// shrinks the popup below the estimate for the current history.
    pub fn size_for(&self, entries: usize) -> PopupSize {
        let estimate = estimate_popup_height(entries, &self.config);
        PopupSize {
            width: self.config.width,
            height: self
                .measured_height()
                .map_or(estimate, |measured| measured.max(estimate)),
        }
    }

    /// Place a popup for `entries` rows at `cursor` and remember the anchor
    /// for later resizes
    pub fn place(
        &self,
        cursor: CursorPosition,
        area: Option<WorkArea>,
        entries: usize,
    ) -> (WindowPosition, PopupSize) {
        let size = self.size_for(entries);
        self.set_anchor(Some(Anchor { cursor, area }));
        (position_in(cursor, area, size), size)
    }

    /// Position for a popup re-measured at `height`, anchored where it was
    /// last opened. `None` when it was never placed.
    pub fn reposition(&self, height: f64) -> Option<WindowPosition> {
        let anchor = self.anchor()?;
        let size = PopupSize {
            width: self.config.width,
            height,
        };
        Some(position_in(anchor.cursor, anchor.area, size))
    }

    fn anchor(&self) -> Option<Anchor> {
        match self.anchor.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_anchor(&self, anchor: Option<Anchor>) {
        let mut guard = match self.anchor.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = anchor;
    }
}

fn position_in(cursor: CursorPosition, area: Option<WorkArea>, size: PopupSize) -> WindowPosition {
    match area {
        Some(area) => compute_popup_position(cursor, area, size),
        None => WindowPosition { x: cursor.x, y: cursor.y },
    }
}

pub fn popup_window<R: Runtime>(app: &AppHandle<R>) -> CommandResult<WebviewWindow<R>> {
    app.get_webview_window(POPUP_WINDOW_LABEL)
        .ok_or_else(|| CommandError::WindowError("Popup window not found".to_string()))
}

/// Get the current cursor position
pub fn get_cursor_position() -> CommandResult<CursorPosition> {
    use mouse_position::mouse_position::Mouse;

    match Mouse::get_mouse_position() {
        Mouse::Position { x, y } => Ok(CursorPosition {
            x: x as f64,
            y: y as f64,
        }),
        Mouse::Error => Err(CommandError::WindowError(
            "Failed to get cursor position".to_string(),
        )),
    }
}

/// Work areas of all displays in logical coordinates
fn work_areas<R: Runtime>(app: &AppHandle<R>) -> CommandResult<Vec<WorkArea>> {
    let monitors = app.available_monitors()?;
    Ok(monitors
        .iter()
        .map(|monitor| {
            let scale = monitor.scale_factor();
            let area = monitor.work_area();
            WorkArea {
                x: area.position.x as f64 / scale,
                y: area.position.y as f64 / scale,
                width: area.size.width as f64 / scale,
                height: area.size.height as f64 / scale,
            }
        })
        .collect())
}

/// Hide the popup if visible, otherwise place it at the cursor and show it
pub fn toggle_popup<R: Runtime>(app: &AppHandle<R>, popup: &PopupState, entries: usize) -> CommandResult<()> {
    let window = popup_window(app)?;
    if window.is_visible()? {
        window.hide()?;
        return Ok(());
    }

    let cursor = get_cursor_position()?;
    let area = nearest_work_area(cursor, &work_areas(app)?);
    if area.is_none() {
        log::warn!("[Popup] No displays reported, opening at cursor");
    }
    let (position, size) = popup.place(cursor, area, entries);

    log::debug!("[Popup] Showing at ({}, {}) size {:?}", position.x, position.y, size);
    window.set_size(LogicalSize::new(size.width, size.height))?;
    window.set_position(LogicalPosition::new(position.x, position.y))?;
    window.show()?;
    window.set_focus()?;
    Ok(())
}

pub fn hide_popup<R: Runtime>(app: &AppHandle<R>) -> CommandResult<()> {
    popup_window(app)?.hide()?;
    Ok(())
}

/// Remember the measured height and resize the popup to it. A visible popup
/// is re-anchored so the new height stays inside the work area.
pub fn resize_popup<R: Runtime>(app: &AppHandle<R>, popup: &PopupState, height: f64) -> CommandResult<()> {
    popup.set_measured_height(height)?;
    let window = popup_window(app)?;
    window.set_size(LogicalSize::new(popup.config().width, height))?;

    if window.is_visible()? {
        if let Some(position) = popup.reposition(height) {
            window.set_position(LogicalPosition::new(position.x, position.y))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_prefers_measured_height() {
        let popup = PopupState::new(PopupConfig::default());
        assert_eq!(popup.size_for(2).height, 84.0);

        popup.set_measured_height(300.0).unwrap();
        assert_eq!(popup.size_for(2), PopupSize { width: 250.0, height: 300.0 });
    }

    fn area() -> WorkArea {
        WorkArea { x: 0.0, y: 0.0, width: 1000.0, height: 1000.0 }
    }

    #[test]
    fn test_short_measurement_does_not_undersize_full_history() {
        let popup = PopupState::new(PopupConfig::default());
        // measured while the history was empty
        popup.set_measured_height(48.0).unwrap();

        let cursor = CursorPosition { x: 100.0, y: 800.0 };
        let (position, size) = popup.place(cursor, Some(area()), 10);

        assert_eq!(size.height, 372.0);
        assert_eq!(position, WindowPosition { x: 100.0, y: 428.0 });
        assert!(position.y + size.height <= area().bottom());
    }

    #[test]
    fn test_reposition_after_ui_grows_popup() {
        let popup = PopupState::new(PopupConfig::default());
        assert_eq!(popup.reposition(300.0), None);

        let cursor = CursorPosition { x: 100.0, y: 800.0 };
        let (position, _) = popup.place(cursor, Some(area()), 1);
        assert_eq!(position, WindowPosition { x: 100.0, y: 800.0 });

        let moved = popup.reposition(400.0).unwrap();
        assert_eq!(moved, WindowPosition { x: 100.0, y: 400.0 });
        assert!(moved.y + 400.0 <= area().bottom());
    }

    #[test]
    fn test_place_without_displays_opens_at_cursor() {
        let popup = PopupState::new(PopupConfig::default());
        let cursor = CursorPosition { x: 5.0, y: 6.0 };
        let (position, _) = popup.place(cursor, None, 3);
        assert_eq!(position, WindowPosition { x: 5.0, y: 6.0 });
    }

    #[test]
    fn test_rejects_bad_height() {
        let popup = PopupState::new(PopupConfig::default());
        assert!(popup.set_measured_height(0.0).is_err());
        assert!(popup.set_measured_height(f64::NAN).is_err());
        assert_eq!(popup.measured_height(), None);
    }
}
