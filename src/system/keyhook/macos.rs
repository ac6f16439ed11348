use crate::core::clipboard::detector::{is_copy_chord, DetectorTrigger};
use block::ConcreteBlock;
use cocoa::appkit::{NSApplication, NSApplicationActivationPolicy};
use cocoa::base::{id, nil};
use cocoa::foundation::{NSAutoreleasePool, NSString};
use objc::{class, msg_send, sel, sel_impl};
use std::ffi::CStr;
use tokio::sync::mpsc;

// NSEventMaskKeyDown
const KEY_DOWN_MASK: u64 = 1 << 10;
// NSEventModifierFlagCommand
const COMMAND_FLAG: u64 = 1 << 20;

unsafe fn characters_ignoring_modifiers(event: id) -> String {
    let characters: id = msg_send![event, charactersIgnoringModifiers];
    if characters == nil {
        return String::new();
    }
    let utf8 = characters.UTF8String();
    if utf8.is_null() {
        return String::new();
    }
    CStr::from_ptr(utf8).to_string_lossy().into_owned()
}

/// Install a global key-down monitor and run the AppKit loop on the calling
/// thread, which must be the main thread. Never returns.
///
/// Global monitors only see other applications' events, and only once Input
/// Monitoring access has been granted; without it the poll still runs.
pub fn run_copy_chord_monitor(triggers: mpsc::UnboundedSender<DetectorTrigger>) {
    unsafe {
        let _pool = NSAutoreleasePool::new(nil);
        let app = NSApplication::sharedApplication(nil);
        app.setActivationPolicy_(NSApplicationActivationPolicy::NSApplicationActivationPolicyProhibited);

        let handler = ConcreteBlock::new(move |event: id| {
            let flags: u64 = msg_send![event, modifierFlags];
            let characters = characters_ignoring_modifiers(event);
            if is_copy_chord(flags & COMMAND_FLAG != 0, &characters) {
                let _ = triggers.send(DetectorTrigger::CopyChord);
            }
        });
        let handler = handler.copy();

        let monitor: id = msg_send![
            class!(NSEvent),
            addGlobalMonitorForEventsMatchingMask: KEY_DOWN_MASK
            handler: &*handler
        ];
        if monitor == nil {
            log::warn!("[KeyHook] Global key monitor unavailable, relying on polling");
        } else {
            log::info!("[KeyHook] Watching for ⌘C / ⌘X");
        }

        app.run();
    }
}
