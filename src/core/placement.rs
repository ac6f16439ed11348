//! Popup placement
//!
//! Pure geometry in logical, top-left-origin coordinates. The popup opens
//! with its top-left corner at the cursor and flips to the other side of the
//! cursor on each axis where it would leave the work area.

use crate::config::PopupConfig;
use crate::shared::types::{CursorPosition, PopupSize, WindowPosition, WorkArea};

/// Top-left corner for a popup of `size` opened at `cursor`
pub fn compute_popup_position(cursor: CursorPosition, area: WorkArea, size: PopupSize) -> WindowPosition {
    let mut x = cursor.x;
    let mut y = cursor.y;

    // Overflows right edge: open to the left of the cursor
    if cursor.x + size.width > area.right() {
        x = cursor.x - size.width;
    }

    // Overflows bottom edge: open above the cursor
    if cursor.y + size.height > area.bottom() {
        y = cursor.y - size.height;
    }

    WindowPosition { x, y }
}

/// Work area of the display under the cursor, else the closest one
pub fn nearest_work_area(cursor: CursorPosition, areas: &[WorkArea]) -> Option<WorkArea> {
    if let Some(area) = areas.iter().find(|area| area.contains(cursor)) {
        return Some(*area);
    }

    areas
        .iter()
        .copied()
        .min_by(|a, b| distance_sq(cursor, a).total_cmp(&distance_sq(cursor, b)))
}

fn distance_sq(point: CursorPosition, area: &WorkArea) -> f64 {
    let dx = if point.x < area.x {
        area.x - point.x
    } else if point.x >= area.right() {
        point.x - area.right()
    } else {
        0.0
    };
    let dy = if point.y < area.y {
        area.y - point.y
    } else if point.y >= area.bottom() {
        point.y - area.bottom()
    } else {
        0.0
    };
    dx * dx + dy * dy
}

/// Height to assume before the UI reports its measured height
pub fn estimate_popup_height(entries: usize, config: &PopupConfig) -> f64 {
    config.header_height + config.row_height * entries.max(1) as f64
}
