//! OS integration: pasteboard, key hook, paste automation, popup window,
//! tray and log setup

pub mod automation;
pub mod clipboard;
pub mod keyhook;
pub mod logging;
pub mod tray;
pub mod window;
