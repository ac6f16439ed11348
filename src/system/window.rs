pub mod popup;

pub use popup::{hide_popup, resize_popup, toggle_popup, PopupState};
