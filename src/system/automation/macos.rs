use super::FrontApp;
use crate::shared::errors::{CommandError, CommandResult};
use cocoa::base::{id, nil};
use cocoa::foundation::{NSString, NSUInteger};
use core_graphics::event::{CGEvent, CGEventFlags, CGEventTapLocation, CGKeyCode};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use objc::{class, msg_send, sel, sel_impl};
use std::thread;
use std::time::Duration;

const KEY_V: CGKeyCode = 0x09;

// NSApplicationActivateIgnoringOtherApps
const ACTIVATE_IGNORING_OTHER_APPS: NSUInteger = 1 << 0;

/// AXIsProcessTrusted: may this process post keyboard events
pub fn check_accessibility_permissions() -> bool {
    #[link(name = "ApplicationServices", kind = "framework")]
    extern "C" {
        fn AXIsProcessTrusted() -> bool;
    }
    unsafe { AXIsProcessTrusted() }
}

unsafe fn nsstring_to_string(value: id) -> Option<String> {
    if value == nil {
        return None;
    }
    let ptr = NSString::UTF8String(value);
    if ptr.is_null() {
        return None;
    }
    Some(std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

/// Frontmost application according to NSWorkspace
pub fn frontmost_app() -> CommandResult<FrontApp> {
    unsafe {
        let workspace: id = msg_send![class!(NSWorkspace), sharedWorkspace];
        let app: id = msg_send![workspace, frontmostApplication];
        if app == nil {
            return Err(CommandError::AutomationError(
                "No frontmost application".to_string(),
            ));
        }

        let pid: i32 = msg_send![app, processIdentifier];
        let name: id = msg_send![app, localizedName];
        Ok(FrontApp {
            pid,
            name: nsstring_to_string(name).unwrap_or_else(|| format!("pid {}", pid)),
        })
    }
}

/// Bring `target` back to the front
fn activate(target: &FrontApp) -> CommandResult<()> {
    unsafe {
        let app: id = msg_send![
            class!(NSRunningApplication),
            runningApplicationWithProcessIdentifier: target.pid
        ];
        if app == nil {
            return Err(CommandError::AutomationError(format!(
                "{} is no longer running",
                target.name
            )));
        }

        let activated: bool = msg_send![app, activateWithOptions: ACTIVATE_IGNORING_OTHER_APPS];
        if !activated {
            return Err(CommandError::AutomationError(format!(
                "Could not activate {}",
                target.name
            )));
        }
    }
    log::debug!("[AutoPaste] Activated {} (pid {})", target.name, target.pid);
    Ok(())
}

fn post_key(source: &CGEventSource, key: CGKeyCode, down: bool, flags: CGEventFlags) -> CommandResult<()> {
    let event = CGEvent::new_keyboard_event(source.clone(), key, down).map_err(|_| {
        CommandError::AutomationError("Failed to create keyboard event".to_string())
    })?;
    event.set_flags(flags);
    event.post(CGEventTapLocation::HID);
    Ok(())
}

/// Post ⌘V to whichever application has focus
pub fn post_command_v() -> CommandResult<()> {
    let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState)
        .map_err(|_| CommandError::AutomationError("Failed to create event source".to_string()))?;
    post_key(&source, KEY_V, true, CGEventFlags::CGEventFlagCommand)?;
    post_key(&source, KEY_V, false, CGEventFlags::CGEventFlagCommand)
}

/// Re-activate `target` when known, give it `delay_ms` to take focus, then
/// send ⌘V
pub fn paste_into(target: Option<&FrontApp>, delay_ms: u64) -> CommandResult<()> {
    if !check_accessibility_permissions() {
        return Err(CommandError::AccessibilityDenied);
    }

    if let Some(target) = target {
        activate(target)?;
    }
    thread::sleep(Duration::from_millis(delay_ms));
    post_command_v()?;

    log::info!(
        "[AutoPaste] Pasted into {}",
        target.map(|t| t.name.as_str()).unwrap_or("frontmost app")
    );
    Ok(())
}
